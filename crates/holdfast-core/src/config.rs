//! Session configuration and policy defaults.

use std::{path::PathBuf, time::Duration};

use crate::event::KeySym;

/// How long the hotkey must be held before the close-all fires.
pub const DEFAULT_HOLD_THRESHOLD: Duration = Duration::from_secs(2);

/// Poll granularity of the hold timer while the hotkey is down.
pub const DEFAULT_HOLD_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Grace period before an ignored close request is escalated.
pub const DEFAULT_CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Minimum gap between consecutive home launches.
pub const DEFAULT_RESPAWN_DELAY: Duration = Duration::from_secs(1);

/// What to do when a client ignores a polite close request.
///
/// The reference implementations disagreed here (one destroyed
/// immediately, one never escalated), so the policy is explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseEscalation {
    /// Wait forever; only the client can end its own surface.
    Never,
    /// Forcefully destroy the surface once the grace period elapses with
    /// no destroy event.
    ForceAfter(Duration),
}

/// Policy knobs for a kiosk session.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    /// Home application executable, launched with no arguments.
    pub home_path: PathBuf,
    /// The global hotkey.
    pub hotkey: KeySym,
    /// Hold duration required to trigger the close-all.
    pub hold_threshold: Duration,
    /// Event-wait timeout while the hotkey is held.
    pub hold_poll_interval: Duration,
    /// Escalation policy for ignored close requests.
    pub close_escalation: CloseEscalation,
    /// Minimum delay between home launches (respawn-storm brake).
    pub respawn_delay: Duration,
}

impl KioskConfig {
    /// Default policy for the given home application.
    pub fn new(home_path: impl Into<PathBuf>) -> Self {
        Self {
            home_path: home_path.into(),
            hotkey: KeySym::SUPER_L,
            hold_threshold: DEFAULT_HOLD_THRESHOLD,
            hold_poll_interval: DEFAULT_HOLD_POLL_INTERVAL,
            close_escalation: CloseEscalation::ForceAfter(DEFAULT_CLOSE_GRACE),
            respawn_delay: DEFAULT_RESPAWN_DELAY,
        }
    }
}
