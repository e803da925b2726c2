//! Stacking-protocol (X11) realization of the kiosk display adapter.
//!
//! Holdfast becomes the window manager by selecting substructure
//! redirection on the root window; a `BadAccess` answer means another
//! manager owns the display and startup aborts. From then on the adapter
//! is a thin translation layer:
//!
//! - `MapRequest` is surface creation (the owner pid is read from
//!   `_NET_WM_PID` when the client sets it), and the window is mapped
//!   immediately; `MapNotify`/`UnmapNotify`/`DestroyNotify` follow the
//!   lifecycle
//! - `ConfigureRequest` is never granted as asked; it is forwarded to the
//!   policy engine, which answers with fullscreen geometry
//! - only the hotkey is grabbed (any modifier state), so every other key
//!   flows directly to the focused client without a round trip through
//!   the manager
//! - a polite close is a `WM_PROTOCOLS`/`WM_DELETE_WINDOW` client
//!   message; escalation uses `DestroyWindow`
//!
//! Event waits poll the connection descriptor with a finite timeout so
//! the single-threaded loop can service hold timers and signal flags.

mod error;

use std::{collections::HashSet, os::fd::AsFd, time::Duration};

use holdfast_core::{
    DisplayBackend, DisplayEvent, Geometry, KeyState, KeySym, OutputId, OutputInfo, Pid, SurfaceId,
};
use nix::{
    errno::Errno,
    poll::{PollFd, PollFlags, PollTimeout, poll},
};
use x11rb::{
    connection::Connection,
    errors::ReplyError,
    protocol::{
        ErrorKind, Event,
        xproto::{
            Atom, AtomEnum, ChangeWindowAttributesAux, ClientMessageEvent, ConfigureWindowAux,
            ConnectionExt, EventMask, GrabMode, InputFocus, Keycode, Mapping, ModMask, StackMode,
            Window,
        },
    },
    rust_connection::RustConnection,
};

pub use error::X11Error;

fn root_event_mask() -> EventMask {
    EventMask::SUBSTRUCTURE_REDIRECT
        | EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::KEY_PRESS
        | EventMask::KEY_RELEASE
}

/// Snapshot of the server's keycode-to-keysym table.
///
/// Refreshed on `MappingNotify` so the hotkey grab survives layout
/// changes.
#[derive(Debug, Clone)]
struct KeyboardMap {
    min_keycode: Keycode,
    keysyms_per_keycode: u8,
    keysyms: Vec<u32>,
}

impl KeyboardMap {
    fn new(min_keycode: Keycode, keysyms_per_keycode: u8, keysyms: Vec<u32>) -> Self {
        Self { min_keycode, keysyms_per_keycode, keysyms }
    }

    /// Unshifted keysym for a keycode, as delivered in key events.
    fn keysym(&self, keycode: Keycode) -> Option<KeySym> {
        if keycode < self.min_keycode {
            return None;
        }
        let index = usize::from(keycode - self.min_keycode) * usize::from(self.keysyms_per_keycode);
        self.keysyms.get(index).copied().filter(|sym| *sym != 0).map(KeySym)
    }

    /// Every keycode producing `sym` in any column (shift levels
    /// included, so a grab catches the key under all modifiers).
    fn keycodes_for(&self, sym: KeySym) -> Vec<Keycode> {
        let per = usize::from(self.keysyms_per_keycode).max(1);
        self.keysyms
            .chunks(per)
            .enumerate()
            .filter(|(_, syms)| syms.contains(&sym.0))
            .map(|(i, _)| self.min_keycode + i as Keycode)
            .collect()
    }
}

/// X11 display backend.
pub struct X11Backend {
    conn: RustConnection,
    root: Window,
    output: OutputInfo,
    wm_protocols: Atom,
    wm_delete_window: Atom,
    net_wm_pid: Atom,
    hotkey: KeySym,
    keymap: KeyboardMap,
    grabbed: Vec<Keycode>,
    /// Windows announced to the policy engine, by MapRequest.
    known: HashSet<Window>,
    display_name: String,
}

impl X11Backend {
    /// Connect to the display and acquire window-management rights.
    ///
    /// # Errors
    ///
    /// [`X11Error::Connect`] when the display cannot be opened and
    /// [`X11Error::AlreadyManaged`] when another window manager owns it;
    /// both are fatal startup errors.
    pub fn connect(display: Option<&str>, hotkey: KeySym) -> Result<Self, X11Error> {
        let (conn, screen_num) = x11rb::connect(display)?;
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let output =
            OutputInfo { id: OutputId(screen_num as u32), width: screen.width_in_pixels,
                height: screen.height_in_pixels };

        // Becoming the window manager is winning the race for
        // substructure redirection on the root window.
        let attrs = ChangeWindowAttributesAux::new().event_mask(root_event_mask());
        match conn.change_window_attributes(root, &attrs)?.check() {
            Ok(()) => {},
            Err(ReplyError::X11Error(err)) if err.error_kind == ErrorKind::Access => {
                return Err(X11Error::AlreadyManaged);
            },
            Err(err) => return Err(err.into()),
        }

        let wm_protocols = intern_atom(&conn, b"WM_PROTOCOLS")?;
        let wm_delete_window = intern_atom(&conn, b"WM_DELETE_WINDOW")?;
        let net_wm_pid = intern_atom(&conn, b"_NET_WM_PID")?;

        let keymap = fetch_keymap(&conn)?;
        let display_name = display
            .map(str::to_owned)
            .or_else(|| std::env::var("DISPLAY").ok())
            .unwrap_or_else(|| ":0".to_owned());

        let mut backend = Self {
            conn,
            root,
            output,
            wm_protocols,
            wm_delete_window,
            net_wm_pid,
            hotkey,
            keymap,
            grabbed: Vec::new(),
            known: HashSet::new(),
            display_name,
        };
        backend.grab_hotkey()?;
        backend.conn.flush()?;

        tracing::info!(display = %backend.display_name, width = output.width,
            height = output.height, "managing display");
        Ok(backend)
    }

    fn grab_hotkey(&mut self) -> Result<(), X11Error> {
        let keycodes = self.keymap.keycodes_for(self.hotkey);
        if keycodes.is_empty() {
            // The kiosk still works without the hotkey; keep running and
            // hope a MappingNotify brings the key back.
            tracing::warn!(hotkey = %self.hotkey, "hotkey not on current keyboard map");
        }
        for keycode in &keycodes {
            self.conn.grab_key(
                true,
                self.root,
                ModMask::ANY,
                *keycode,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )?;
        }
        tracing::debug!(hotkey = %self.hotkey, ?keycodes, "hotkey grabbed");
        self.grabbed = keycodes;
        Ok(())
    }

    fn refresh_keymap(&mut self) -> Result<(), X11Error> {
        for keycode in std::mem::take(&mut self.grabbed) {
            self.conn.ungrab_key(keycode, self.root, ModMask::ANY)?;
        }
        self.keymap = fetch_keymap(&self.conn)?;
        self.grab_hotkey()
    }

    /// Owner pid from `_NET_WM_PID`, when the client advertises one.
    fn window_pid(&self, window: Window) -> Option<Pid> {
        let cookie = self
            .conn
            .get_property(false, window, self.net_wm_pid, AtomEnum::CARDINAL, 0, 1)
            .ok()?;
        let reply = cookie.reply().ok()?;
        let pid = reply.value32()?.next()?;
        Some(Pid(pid as i32))
    }

    fn translate(&mut self, event: Event) -> Result<Option<DisplayEvent>, X11Error> {
        match event {
            Event::MapRequest(e) => {
                if self.known.contains(&e.window) {
                    // A client may re-request mapping of a window we
                    // already manage; just map it again.
                    self.conn.map_window(e.window)?;
                    return Ok(None);
                }
                self.known.insert(e.window);
                let owner = self.window_pid(e.window);
                self.conn.map_window(e.window)?;
                Ok(Some(DisplayEvent::SurfaceCreated { surface: surface_id(e.window), owner }))
            },

            Event::MapNotify(e) if self.known.contains(&e.window) => {
                Ok(Some(DisplayEvent::SurfaceMapped { surface: surface_id(e.window) }))
            },

            Event::UnmapNotify(e)
                if self.known.contains(&e.window) && e.response_type & 0x80 == 0 =>
            {
                Ok(Some(DisplayEvent::SurfaceUnmapped { surface: surface_id(e.window) }))
            },

            Event::DestroyNotify(e) => {
                if self.known.remove(&e.window) {
                    Ok(Some(DisplayEvent::SurfaceDestroyed { surface: surface_id(e.window) }))
                } else {
                    Ok(None)
                }
            },

            Event::ConfigureRequest(e) => Ok(Some(DisplayEvent::ConfigureRequested {
                surface: surface_id(e.window),
                width: e.width,
                height: e.height,
            })),

            Event::ConfigureNotify(e) if e.window == self.root => {
                // Root geometry change: the screen was resized. Reported
                // as an update of the same output.
                self.output.width = e.width;
                self.output.height = e.height;
                Ok(Some(DisplayEvent::OutputAdded { output: self.output }))
            },

            Event::KeyPress(e) => Ok(self.keymap.keysym(e.detail).map(|sym| DisplayEvent::Key {
                sym,
                state: KeyState::Pressed,
            })),

            Event::KeyRelease(e) => Ok(self.keymap.keysym(e.detail).map(|sym| {
                DisplayEvent::Key { sym, state: KeyState::Released }
            })),

            Event::MappingNotify(e) if e.request == Mapping::KEYBOARD => {
                self.refresh_keymap()?;
                Ok(None)
            },

            Event::Error(e) => {
                // Requests against windows that died mid-flight answer
                // with errors here; they are expected in a kiosk.
                tracing::debug!(error = ?e, "asynchronous protocol error");
                Ok(None)
            },

            _ => Ok(None),
        }
    }

    /// Block on the connection descriptor until it is readable.
    ///
    /// Returns `false` on timeout or signal interruption.
    fn wait_readable(&self, timeout: Option<Duration>) -> Result<bool, X11Error> {
        let poll_timeout = match timeout {
            None => PollTimeout::NONE,
            Some(t) => i32::try_from(t.as_millis())
                .ok()
                .and_then(|ms| PollTimeout::try_from(ms).ok())
                .unwrap_or(PollTimeout::MAX),
        };

        let stream = self.conn.stream();
        let mut fds = [PollFd::new(stream.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, poll_timeout) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(true),
            // A signal (SIGCHLD, SIGTERM) interrupted the wait; surface
            // it as a timeout so the loop services its flags.
            Err(Errno::EINTR) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

impl DisplayBackend for X11Backend {
    type Error = X11Error;

    fn outputs(&mut self) -> Result<Vec<OutputInfo>, Self::Error> {
        Ok(vec![self.output])
    }

    fn next_event(&mut self, timeout: Option<Duration>)
    -> Result<Option<DisplayEvent>, Self::Error> {
        loop {
            while let Some(event) = self.conn.poll_for_event()? {
                if let Some(translated) = self.translate(event)? {
                    return Ok(Some(translated));
                }
            }
            if !self.wait_readable(timeout)? {
                return Ok(None);
            }
        }
    }

    fn force_fullscreen(&mut self, surface: SurfaceId, geometry: Geometry)
    -> Result<(), Self::Error> {
        let aux = ConfigureWindowAux::new()
            .x(geometry.x)
            .y(geometry.y)
            .width(u32::from(geometry.width))
            .height(u32::from(geometry.height))
            .border_width(0);
        self.conn.configure_window(window_of(surface), &aux)?;
        Ok(())
    }

    fn raise_and_focus(&mut self, surface: SurfaceId) -> Result<(), Self::Error> {
        let window = window_of(surface);
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))?;
        self.conn.set_input_focus(InputFocus::PARENT, window, x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn request_close(&mut self, surface: SurfaceId) -> Result<(), Self::Error> {
        let window = window_of(surface);
        let message = ClientMessageEvent::new(
            32,
            window,
            self.wm_protocols,
            [self.wm_delete_window, 0, 0, 0, 0],
        );
        self.conn.send_event(false, window, EventMask::NO_EVENT, message)?;
        Ok(())
    }

    fn force_destroy(&mut self, surface: SurfaceId) -> Result<(), Self::Error> {
        self.conn.destroy_window(window_of(surface))?;
        Ok(())
    }

    fn forward_key(&mut self, sym: KeySym, state: KeyState) -> Result<(), Self::Error> {
        // Only the hotkey is grabbed; everything else already went to the
        // focused client without passing through the manager.
        tracing::trace!(%sym, ?state, "key event needs no forwarding on this backend");
        Ok(())
    }

    fn connection_env(&self) -> Vec<(String, String)> {
        vec![("DISPLAY".to_owned(), self.display_name.clone())]
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.conn.flush()?;
        Ok(())
    }
}

fn surface_id(window: Window) -> SurfaceId {
    SurfaceId(u64::from(window))
}

fn window_of(surface: SurfaceId) -> Window {
    surface.0 as Window
}

fn intern_atom(conn: &RustConnection, name: &[u8]) -> Result<Atom, X11Error> {
    Ok(conn.intern_atom(false, name)?.reply()?.atom)
}

fn fetch_keymap(conn: &RustConnection) -> Result<KeyboardMap, X11Error> {
    let setup = conn.setup();
    let (min, max) = (setup.min_keycode, setup.max_keycode);
    let reply = conn.get_keyboard_mapping(min, max - min + 1)?.reply()?;
    Ok(KeyboardMap::new(min, reply.keysyms_per_keycode, reply.keysyms))
}
