//! Events consumed and actions produced by the policy engine.
//!
//! The core is Sans-IO: a display adapter translates protocol traffic into
//! [`DisplayEvent`]s, the [`Session`](crate::session::Session) folds them
//! into state and returns [`KioskAction`]s, and the adapter executes those
//! against the display. Surfaces and outputs cross the boundary as plain
//! ids; the core never holds a pointer into backend-owned memory.

use std::{fmt, path::PathBuf};

/// Backend-native handle of a client window.
///
/// Opaque to the core and unique while the surface is alive. Handles may be
/// reused by the backend after a destroy event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Backend-native handle of a display output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId(pub u32);

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// OS process id of a client, as reported by the backend or recorded by the
/// home supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pid(pub i32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keyboard symbol in X11 keysym encoding.
///
/// Both in-repo adapters speak this encoding; a compositing adapter maps
/// its native symbols at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySym(pub u32);

impl KeySym {
    /// Left Super (the reference hotkey on the stacking backend).
    pub const SUPER_L: KeySym = KeySym(0xffeb);
    /// Return (the reference hotkey on the compositing backend).
    pub const RETURN: KeySym = KeySym(0xff0d);
}

impl fmt::Display for KeySym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Direction of a keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Key went down (including hardware auto-repeat).
    Pressed,
    /// Key went up.
    Released,
}

/// A display output and its pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputInfo {
    /// Backend-native output handle.
    pub id: OutputId,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
}

/// Absolute surface geometry, in output coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
}

impl Geometry {
    /// The fullscreen geometry covering `output` entirely.
    pub fn fullscreen(output: &OutputInfo) -> Self {
        Self { x: 0, y: 0, width: output.width, height: output.height }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Events the policy engine consumes.
///
/// Produced by a [`DisplayBackend`](crate::backend::DisplayBackend) from
/// protocol traffic. Order within one client is protocol order; order
/// across clients is arbitrary, and the session must tolerate any
/// interleaving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// An output appeared, or an existing output changed geometry
    /// (same id, new dimensions).
    OutputAdded {
        /// The new or updated output.
        output: OutputInfo,
    },

    /// An output disappeared.
    OutputRemoved {
        /// The departed output.
        output: OutputId,
    },

    /// A client created a window.
    SurfaceCreated {
        /// Backend handle for the new surface.
        surface: SurfaceId,
        /// Owning process, when the backend can report it.
        owner: Option<Pid>,
    },

    /// A surface became visible.
    SurfaceMapped {
        /// The mapped surface.
        surface: SurfaceId,
    },

    /// A surface became invisible without being destroyed.
    SurfaceUnmapped {
        /// The unmapped surface.
        surface: SurfaceId,
    },

    /// A surface was destroyed by its client.
    SurfaceDestroyed {
        /// The destroyed surface.
        surface: SurfaceId,
    },

    /// A client asked for a specific size or position.
    ///
    /// The session always answers with fullscreen geometry; the requested
    /// dimensions are recorded here for diagnostics only.
    ConfigureRequested {
        /// The requesting surface.
        surface: SurfaceId,
        /// Requested width.
        width: u16,
        /// Requested height.
        height: u16,
    },

    /// A keyboard key changed state.
    Key {
        /// Resolved key symbol.
        sym: KeySym,
        /// Press or release.
        state: KeyState,
    },

    /// An input device was attached.
    InputDeviceAdded {
        /// Device description, for diagnostics.
        name: String,
    },
}

/// Actions the policy engine produces.
///
/// Executed by the run loop against the display backend and the process
/// host. Execution failures for a single surface are logged and skipped;
/// they never abort the remaining actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KioskAction {
    /// Resize and reposition a surface to cover an output, stripping any
    /// border or decoration.
    Fullscreen {
        /// Target surface.
        surface: SurfaceId,
        /// Geometry to enforce.
        geometry: Geometry,
    },

    /// Move a surface to the top of the stacking order and give it
    /// keyboard focus.
    RaiseAndFocus {
        /// Target surface.
        surface: SurfaceId,
    },

    /// Ask a surface to close politely. Destruction is not guaranteed.
    RequestClose {
        /// Target surface.
        surface: SurfaceId,
    },

    /// Destroy a surface that ignored a polite close request.
    ForceDestroy {
        /// Target surface.
        surface: SurfaceId,
    },

    /// Deliver a non-hotkey key event to the focused surface.
    ForwardKey {
        /// Key symbol.
        sym: KeySym,
        /// Press or release.
        state: KeyState,
    },

    /// Launch the home application.
    SpawnHome {
        /// Executable to launch, with no arguments.
        path: PathBuf,
    },
}
