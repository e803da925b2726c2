//! Backend-agnostic kiosk window-management policy engine.
//!
//! Holdfast turns a display into a single-purpose appliance: one
//! supervised "home" application, every client window forced fullscreen,
//! and a global hold-to-trigger hotkey that tears down everything except
//! home. This crate is the policy core shared by every protocol
//! realization; it performs no I/O and reads no clock.
//!
//! # Architecture
//!
//! ```text
//! DisplayBackend ──events──> run loop ──> Session ──actions──> DisplayBackend
//!                               │            ├─ SurfaceRegistry
//!   ProcessHost  ──exits───────┘            ├─ Hotkey
//!       ^                                    └─ HomeSupervisor
//!       └──────────── SpawnHome ─────────────────────┘
//! ```
//!
//! # Module Structure
//!
//! - [`event`]: events in, actions out, and the id/geometry vocabulary
//! - [`session`]: the dispatcher folding events into policy decisions
//! - [`registry`]: live surfaces and home attribution
//! - [`hotkey`]: hold-to-trigger gesture state machine
//! - [`supervisor`]: home launch/respawn policy and the process-host seam
//! - [`backend`]: the display adapter contract
//! - [`runtime`]: the production/simulation-shared event loop
//! - [`clock`]: monotonic time abstraction
//! - [`config`]: policy knobs and defaults

pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod hotkey;
pub mod registry;
pub mod runtime;
pub mod session;
pub mod supervisor;

pub use backend::DisplayBackend;
pub use clock::{Clock, SystemClock};
pub use config::{CloseEscalation, KioskConfig};
pub use error::RuntimeError;
pub use event::{
    DisplayEvent, Geometry, KeyState, KeySym, KioskAction, OutputId, OutputInfo, Pid, SurfaceId,
};
pub use hotkey::{Hotkey, HotkeyState};
pub use registry::{HomeClaim, Surface, SurfaceRegistry};
pub use runtime::run;
pub use session::Session;
pub use supervisor::{ChildExit, HomeSupervisor, ProcessHost};
