//! Deterministic simulation harness for the kiosk policy engine.
//!
//! Provides fake realizations of the three seams the run loop depends on,
//! so every scenario from the design (surface lifecycle races, hold
//! timing, respawn storms, close escalation) runs without a display, a
//! child process, or real time:
//!
//! - [`ScriptedBackend`]: a [`DisplayBackend`](holdfast_core::DisplayBackend)
//!   over a fixed event script, recording every adapter call
//! - [`FakeHost`]: a [`ProcessHost`](holdfast_core::ProcessHost) with
//!   recorded spawns and injected exits
//! - [`VirtualClock`]: a manually advanced [`Clock`](holdfast_core::Clock)
//!
//! The scripted backend is also the second in-repo realization of the
//! display adapter contract, next to the stacking-protocol one.

pub mod backend;
pub mod clock;
pub mod host;
pub mod invariants;

pub use backend::{BackendCall, ScriptExhausted, ScriptedBackend, Step};
pub use clock::VirtualClock;
pub use host::{FakeHost, SpawnRecord, SpawnRefused};
