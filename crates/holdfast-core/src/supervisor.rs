//! Home-application supervision.
//!
//! The supervisor decides when the home application must be (re)launched;
//! the actual process creation and reaping live behind [`ProcessHost`] so
//! production and simulation share the same policy code.
//!
//! # State Machine
//!
//! ```text
//! ┌─────────────┐  launched   ┌─────────┐  home gone   ┌────────────────┐
//! │ NotLaunched │────────────>│ Running │─────────────>│ RespawnPending │
//! └─────────────┘             └─────────┘              └────────────────┘
//!                                  ^       launched            │
//!                                  └───────────────────────────┘
//! ```
//!
//! "Home gone" is either the home surface being destroyed or the home pid
//! exiting; both signals for the same death collapse into a single
//! transition, so one death causes exactly one relaunch. Launches are
//! paced by a minimum inter-launch delay so a crash-looping home cannot
//! spin the manager.

use std::{ops::Sub, path::Path, time::Duration};

use crate::event::Pid;

/// A reaped child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    /// Pid of the terminated child.
    pub pid: Pid,
    /// Exit code, when the child exited normally.
    pub code: Option<i32>,
}

/// OS seam for child-process management.
///
/// The production host forks/execs real processes and drains a SIGCHLD
/// flag; the harness records spawns and injects exits. Neither side is
/// allowed to block: `spawn` is fire-and-forget and `reap` must only
/// collect already-terminated children.
pub trait ProcessHost {
    /// Spawn failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Launch `path` with no arguments and the given extra environment
    /// (the backend's display-connection variables), detached from the
    /// controlling terminal.
    fn spawn(&mut self, path: &Path, env: &[(String, String)]) -> Result<Pid, Self::Error>;

    /// Collect every child that has terminated since the last call,
    /// without blocking. Must reap all children, not just the home
    /// application, so no zombie accumulates.
    fn reap(&mut self) -> Vec<ChildExit>;

    /// Whether an external shutdown signal has been received.
    fn shutdown_requested(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HomeState {
    NotLaunched,
    Running(Pid),
    RespawnPending,
}

/// Relaunch policy for the home application.
#[derive(Debug, Clone)]
pub struct HomeSupervisor<I> {
    state: HomeState,
    /// Time of the most recent spawn attempt (success or failure).
    last_attempt: Option<I>,
    respawn_delay: Duration,
    /// Set after a launch until its first surface is attributed.
    awaiting_first_surface: bool,
}

impl<I> HomeSupervisor<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// New supervisor; nothing launched yet.
    pub fn new(respawn_delay: Duration) -> Self {
        Self {
            state: HomeState::NotLaunched,
            last_attempt: None,
            respawn_delay,
            awaiting_first_surface: false,
        }
    }

    /// Pid of the currently running home process, if any.
    #[must_use]
    pub fn home_pid(&self) -> Option<Pid> {
        match self.state {
            HomeState::Running(pid) => Some(pid),
            _ => None,
        }
    }

    /// Whether a launch is due now (first launch, or a respawn whose
    /// inter-launch delay has elapsed).
    #[must_use]
    pub fn wants_spawn(&self, now: I) -> bool {
        match self.state {
            HomeState::Running(_) => false,
            HomeState::NotLaunched | HomeState::RespawnPending => self.delay_elapsed(now),
        }
    }

    /// Time until a pending launch becomes due, for the event-wait
    /// timeout. `None` when no launch is pending or it is due already.
    #[must_use]
    pub fn spawn_deadline(&self, now: I) -> Option<Duration> {
        if matches!(self.state, HomeState::Running(_)) {
            return None;
        }
        let last = self.last_attempt?;
        let elapsed = now - last;
        self.respawn_delay.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Record a successful launch.
    pub fn launched(&mut self, pid: Pid, now: I) {
        self.state = HomeState::Running(pid);
        self.last_attempt = Some(now);
        self.awaiting_first_surface = true;
    }

    /// Record a failed spawn attempt; the retry is paced like a respawn.
    pub fn launch_failed(&mut self, now: I) {
        self.last_attempt = Some(now);
        self.awaiting_first_surface = false;
    }

    /// Feed a reaped child. Returns `true` iff it was the current home
    /// process and a respawn is now pending.
    pub fn child_exited(&mut self, pid: Pid) -> bool {
        match self.state {
            HomeState::Running(home) if home == pid => {
                self.home_gone();
                true
            },
            _ => false,
        }
    }

    /// The home surface was destroyed. Returns `true` iff this newly
    /// scheduled a respawn (deduplicates against a pid exit already seen
    /// for the same death).
    pub fn home_surface_destroyed(&mut self) -> bool {
        match self.state {
            HomeState::Running(_) => {
                self.home_gone();
                true
            },
            _ => false,
        }
    }

    /// Resolve the home claim for a surface with the given reported owner.
    pub fn claim(&mut self, owner: Option<Pid>) -> crate::registry::HomeClaim {
        match (owner, self.home_pid()) {
            (Some(_), Some(home)) => crate::registry::HomeClaim::OwnerPid(home),
            (None, _) if self.awaiting_first_surface => {
                self.awaiting_first_surface = false;
                crate::registry::HomeClaim::FirstSurface
            },
            _ => crate::registry::HomeClaim::None,
        }
    }

    /// The home surface has been identified; stop waiting for one.
    pub fn surface_attributed(&mut self) {
        self.awaiting_first_surface = false;
    }

    fn home_gone(&mut self) {
        self.state = HomeState::RespawnPending;
        self.awaiting_first_surface = false;
    }

    fn delay_elapsed(&self, now: I) -> bool {
        self.last_attempt.is_none_or(|last| now - last >= self.respawn_delay)
    }
}
