//! Scripted display backend.
//!
//! Implements [`DisplayBackend`] over a fixed script of events, recording
//! every call the run loop makes. The same orchestration code that drives
//! the production X11 adapter runs against this one in tests, with a
//! virtual clock standing in for real waits.

use std::{collections::VecDeque, rc::Rc, time::Duration};

use holdfast_core::{
    DisplayBackend, DisplayEvent, Geometry, KeyState, KeySym, OutputInfo, SurfaceId,
};

use crate::clock::VirtualClock;

/// One step of a backend script.
#[derive(Debug, Clone)]
pub enum Step {
    /// Deliver this event to the run loop.
    Event(DisplayEvent),
    /// Report an event-wait timeout (drives the tick path).
    Timeout,
    /// Advance the shared virtual clock, then continue with the next step.
    Advance(Duration),
}

/// Error produced when the script runs out.
///
/// Doubles as the "display connection lost" fatal path in run-loop tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptExhausted;

impl std::fmt::Display for ScriptExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "backend script exhausted")
    }
}

impl std::error::Error for ScriptExhausted {}

/// A backend call observed by the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// `force_fullscreen(surface, geometry)`.
    Fullscreen {
        /// Target surface.
        surface: SurfaceId,
        /// Enforced geometry.
        geometry: Geometry,
    },
    /// `raise_and_focus(surface)`.
    RaiseAndFocus {
        /// Target surface.
        surface: SurfaceId,
    },
    /// `request_close(surface)`.
    RequestClose {
        /// Target surface.
        surface: SurfaceId,
    },
    /// `force_destroy(surface)`.
    ForceDestroy {
        /// Target surface.
        surface: SurfaceId,
    },
    /// `forward_key(sym, state)`.
    ForwardKey {
        /// Key symbol.
        sym: KeySym,
        /// Press or release.
        state: KeyState,
    },
}

/// Scripted [`DisplayBackend`] with recorded calls.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    outputs: Vec<OutputInfo>,
    script: VecDeque<Step>,
    clock: Option<Rc<VirtualClock>>,
    /// Every adapter call the run loop issued, in order.
    pub calls: Vec<BackendCall>,
    /// Timeouts passed to `next_event`, in order.
    pub waits: Vec<Option<Duration>>,
}

impl ScriptedBackend {
    /// Backend advertising the given outputs at startup.
    pub fn new(outputs: Vec<OutputInfo>) -> Self {
        Self { outputs, ..Self::default() }
    }

    /// Attach the shared clock that [`Step::Advance`] manipulates.
    #[must_use]
    pub fn with_clock(mut self, clock: Rc<VirtualClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Append a script step.
    pub fn push(&mut self, step: Step) {
        self.script.push_back(step);
    }

    /// Append several script steps.
    pub fn extend(&mut self, steps: impl IntoIterator<Item = Step>) {
        self.script.extend(steps);
    }

    /// Recorded calls of one kind, in order.
    pub fn calls_matching(&self, pred: impl Fn(&BackendCall) -> bool) -> Vec<BackendCall> {
        self.calls.iter().filter(|call| pred(call)).cloned().collect()
    }
}

impl DisplayBackend for ScriptedBackend {
    type Error = ScriptExhausted;

    fn outputs(&mut self) -> Result<Vec<OutputInfo>, Self::Error> {
        Ok(self.outputs.clone())
    }

    fn next_event(&mut self, timeout: Option<Duration>)
    -> Result<Option<DisplayEvent>, Self::Error> {
        self.waits.push(timeout);
        loop {
            match self.script.pop_front() {
                Some(Step::Event(event)) => {
                    tracing::debug!(?event, "script delivers event");
                    return Ok(Some(event));
                },
                Some(Step::Timeout) => return Ok(None),
                Some(Step::Advance(delta)) => {
                    if let Some(clock) = &self.clock {
                        clock.advance(delta);
                    }
                },
                None => return Err(ScriptExhausted),
            }
        }
    }

    fn force_fullscreen(&mut self, surface: SurfaceId, geometry: Geometry)
    -> Result<(), Self::Error> {
        self.calls.push(BackendCall::Fullscreen { surface, geometry });
        Ok(())
    }

    fn raise_and_focus(&mut self, surface: SurfaceId) -> Result<(), Self::Error> {
        self.calls.push(BackendCall::RaiseAndFocus { surface });
        Ok(())
    }

    fn request_close(&mut self, surface: SurfaceId) -> Result<(), Self::Error> {
        self.calls.push(BackendCall::RequestClose { surface });
        Ok(())
    }

    fn force_destroy(&mut self, surface: SurfaceId) -> Result<(), Self::Error> {
        self.calls.push(BackendCall::ForceDestroy { surface });
        Ok(())
    }

    fn forward_key(&mut self, sym: KeySym, state: KeyState) -> Result<(), Self::Error> {
        self.calls.push(BackendCall::ForwardKey { sym, state });
        Ok(())
    }

    fn connection_env(&self) -> Vec<(String, String)> {
        vec![("DISPLAY".to_string(), ":9".to_string())]
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
