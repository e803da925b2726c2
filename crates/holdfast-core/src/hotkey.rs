//! Hold-to-trigger hotkey state machine.
//!
//! A tap must do nothing; only a sustained press fires the close-all. The
//! machine is pure (time is a parameter, never read inside) so hold timing
//! is testable with a virtual clock.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐  keydown   ┌─────────┐  held >= threshold  ┌───────────┐
//! │ Idle │───────────>│ Pressed │────────────────────>│ Triggered │
//! └──────┘            └─────────┘                     └───────────┘
//!     ^                    │ keyup                         │ keyup
//!     └────────────────────┴───────────────────────────────┘
//! ```
//!
//! Auto-repeat keydowns while `Pressed` or `Triggered` are ignored and
//! never restart the timer. `Triggered` latches until key-up, so one hold
//! fires at most one close-all.

use std::{ops::Sub, time::Duration};

/// Current phase of the hotkey gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyState<I> {
    /// Hotkey is up.
    Idle,
    /// Hotkey is down, hold threshold not yet reached.
    Pressed {
        /// When the initial (non-repeat) keydown arrived.
        since: I,
    },
    /// The hold fired; waiting for key-up.
    Triggered,
}

/// Hold-to-trigger detector for the global hotkey.
#[derive(Debug, Clone, Copy)]
pub struct Hotkey<I> {
    state: HotkeyState<I>,
    hold_threshold: Duration,
}

impl<I> Hotkey<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an idle detector with the given hold threshold.
    pub fn new(hold_threshold: Duration) -> Self {
        Self { state: HotkeyState::Idle, hold_threshold }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> HotkeyState<I> {
        self.state
    }

    /// Whether the hold timer is running (and the event loop should poll
    /// at tick granularity).
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        matches!(self.state, HotkeyState::Pressed { .. })
    }

    /// Record a hotkey keydown. Repeats while already down are ignored.
    pub fn on_press(&mut self, now: I) {
        if matches!(self.state, HotkeyState::Idle) {
            self.state = HotkeyState::Pressed { since: now };
        }
    }

    /// Record a hotkey keyup, cancelling a pending hold.
    pub fn on_release(&mut self) {
        self.state = HotkeyState::Idle;
    }

    /// Re-evaluate the hold timer.
    ///
    /// Returns `true` exactly once per gesture, at the transition from
    /// `Pressed` to `Triggered`. Called from the poll-tick path and from
    /// every repeat keydown (repeats can arrive faster than the tick and
    /// would otherwise starve the timeout path).
    pub fn check_hold(&mut self, now: I) -> bool {
        match self.state {
            HotkeyState::Pressed { since } if now - since >= self.hold_threshold => {
                self.state = HotkeyState::Triggered;
                true
            },
            _ => false,
        }
    }
}
