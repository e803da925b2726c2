//! Display backend adapter contract.
//!
//! A backend is the protocol-specific shim between the policy engine and
//! a concrete display stack. The engine drives it in exactly one way:
//! wait for the next [`DisplayEvent`], then execute the resulting
//! [`KioskAction`](crate::event::KioskAction)s through the methods below.
//!
//! In-repo realizations: the stacking-protocol adapter in `holdfast-x11`
//! (production) and the scripted adapter in `holdfast-harness`
//! (simulation). A compositing-protocol adapter plugs into the same trait.
//!
//! # Failure semantics
//!
//! Errors from [`next_event`](DisplayBackend::next_event) are fatal: the
//! display connection is gone and the run loop ends. Errors from the
//! per-surface calls are not: the target client may have exited between
//! the decision and the call, so the run loop logs and moves on.

use std::time::Duration;

use crate::event::{DisplayEvent, Geometry, KeyState, KeySym, OutputInfo, SurfaceId};

/// Protocol adapter driven by the run loop.
pub trait DisplayBackend {
    /// Backend failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Enumerate current outputs. Called once at startup; later changes
    /// arrive as [`DisplayEvent::OutputAdded`]/[`DisplayEvent::OutputRemoved`].
    fn outputs(&mut self) -> Result<Vec<OutputInfo>, Self::Error>;

    /// Block until the next event, for at most `timeout`.
    ///
    /// `None` blocks indefinitely. Returns `Ok(None)` when the timeout
    /// elapses or the wait is interrupted by a signal; the loop then runs
    /// its timer work and re-checks shutdown flags.
    fn next_event(&mut self, timeout: Option<Duration>) -> Result<Option<DisplayEvent>, Self::Error>;

    /// Make the surface's visible geometry exactly `geometry`, with no
    /// border or decoration. Idempotent; clients re-request geometry
    /// freely and every request is answered with another enforcement.
    fn force_fullscreen(&mut self, surface: SurfaceId, geometry: Geometry)
    -> Result<(), Self::Error>;

    /// Move the surface to the top of the stacking order and give it
    /// keyboard focus.
    fn raise_and_focus(&mut self, surface: SurfaceId) -> Result<(), Self::Error>;

    /// Send a polite close request. Destruction is not guaranteed; the
    /// session escalates via [`force_destroy`](Self::force_destroy) if
    /// the grace period expires.
    fn request_close(&mut self, surface: SurfaceId) -> Result<(), Self::Error>;

    /// Destroy a surface that ignored a close request.
    fn force_destroy(&mut self, surface: SurfaceId) -> Result<(), Self::Error>;

    /// Deliver a non-hotkey key event to the focused surface.
    ///
    /// Backends where unhandled input already flows directly to the
    /// client (a stacking protocol with only the hotkey grabbed) may
    /// implement this as a no-op.
    fn forward_key(&mut self, sym: KeySym, state: KeyState) -> Result<(), Self::Error>;

    /// Environment variables children need to reach this display session
    /// (e.g. `DISPLAY`). Applied by the process host at spawn time.
    fn connection_env(&self) -> Vec<(String, String)>;

    /// Commit buffered protocol requests. Called once per loop iteration.
    fn flush(&mut self) -> Result<(), Self::Error>;
}
