//! Fake process host.
//!
//! Records spawn requests, injects child exits, and scripts spawn
//! failures and shutdown signals, so supervision policy is testable
//! without forking a single real process.

use std::{
    cell::Cell,
    collections::VecDeque,
    path::{Path, PathBuf},
};

use holdfast_core::{ChildExit, Pid, ProcessHost};

/// One recorded spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRecord {
    /// Executable the run loop asked for.
    pub path: PathBuf,
    /// Environment handed over from the backend.
    pub env: Vec<(String, String)>,
    /// Pid assigned to the fake child.
    pub pid: Pid,
}

/// Scripted spawn failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRefused;

impl std::fmt::Display for SpawnRefused {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "spawn refused by script")
    }
}

impl std::error::Error for SpawnRefused {}

/// Fake [`ProcessHost`] for run-loop and supervision tests.
#[derive(Debug, Default)]
pub struct FakeHost {
    /// Every successful spawn, in order.
    pub spawned: Vec<SpawnRecord>,
    exits: VecDeque<ChildExit>,
    next_pid: i32,
    fail_next_spawns: usize,
    shutdown_after_checks: Cell<Option<usize>>,
}

impl FakeHost {
    /// Host that spawns successfully with pids 1000, 1001, ...
    pub fn new() -> Self {
        Self { next_pid: 1000, ..Self::default() }
    }

    /// Make the next `count` spawn attempts fail.
    pub fn refuse_spawns(&mut self, count: usize) {
        self.fail_next_spawns = count;
    }

    /// Queue a child exit for the next reap.
    pub fn inject_exit(&mut self, exit: ChildExit) {
        self.exits.push_back(exit);
    }

    /// Report shutdown after this many `shutdown_requested` checks (one
    /// check per loop iteration), bounding run-loop tests.
    pub fn shutdown_after(&mut self, checks: usize) {
        self.shutdown_after_checks.set(Some(checks));
    }

    /// Pid of the most recent spawn.
    pub fn last_pid(&self) -> Option<Pid> {
        self.spawned.last().map(|record| record.pid)
    }
}

impl ProcessHost for FakeHost {
    type Error = SpawnRefused;

    fn spawn(&mut self, path: &Path, env: &[(String, String)]) -> Result<Pid, Self::Error> {
        if self.fail_next_spawns > 0 {
            self.fail_next_spawns -= 1;
            return Err(SpawnRefused);
        }
        let pid = Pid(self.next_pid);
        self.next_pid += 1;
        tracing::debug!(path = %path.display(), %pid, "fake spawn");
        self.spawned.push(SpawnRecord { path: path.to_path_buf(), env: env.to_vec(), pid });
        Ok(pid)
    }

    fn reap(&mut self) -> Vec<ChildExit> {
        self.exits.drain(..).collect()
    }

    fn shutdown_requested(&self) -> bool {
        match self.shutdown_after_checks.get() {
            None => false,
            Some(0) => true,
            Some(remaining) => {
                self.shutdown_after_checks.set(Some(remaining - 1));
                false
            },
        }
    }
}
