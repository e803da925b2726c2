//! OS process host: spawning and reaping real children.
//!
//! Signal handlers only set flags ([`signal_hook::flag`]); everything
//! they imply runs inside the event loop. `reap` drains
//! `waitpid(WNOHANG)` for every child, not just the home application, so
//! no zombie accumulates no matter who spawned what.

use std::{
    path::Path,
    process::{Command, Stdio},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use holdfast_core::{ChildExit, Pid, ProcessHost};
use nix::{
    errno::Errno,
    sys::wait::{WaitPidFlag, WaitStatus, waitpid},
};
use signal_hook::consts::signal::{SIGCHLD, SIGINT, SIGTERM};

/// [`ProcessHost`] backed by the operating system.
#[derive(Debug)]
pub struct OsProcessHost {
    child_exited: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
}

impl OsProcessHost {
    /// Register signal flags. Must run before the first spawn so no
    /// SIGCHLD is lost.
    pub fn new() -> Result<Self, std::io::Error> {
        let child_exited = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(AtomicBool::new(false));

        signal_hook::flag::register(SIGCHLD, Arc::clone(&child_exited))?;
        signal_hook::flag::register(SIGINT, Arc::clone(&shutdown))?;
        signal_hook::flag::register(SIGTERM, Arc::clone(&shutdown))?;

        Ok(Self { child_exited, shutdown })
    }
}

impl ProcessHost for OsProcessHost {
    type Error = std::io::Error;

    fn spawn(&mut self, path: &Path, env: &[(String, String)]) -> Result<Pid, Self::Error> {
        use std::os::unix::process::CommandExt;

        let mut command = Command::new(path);
        // Own process group detaches the child from our terminal; stdin
        // is closed so a console-reading child cannot steal ours. Exec
        // failure surfaces as an error here, in the parent; the child
        // never falls through into manager code.
        command.stdin(Stdio::null()).process_group(0);
        for (key, value) in env {
            command.env(key, value);
        }

        let child = command.spawn()?;
        // The handle is dropped on purpose: the reaper below collects the
        // exit via waitpid, std's drop neither kills nor waits.
        Ok(Pid(child.id() as i32))
    }

    fn reap(&mut self) -> Vec<ChildExit> {
        if !self.child_exited.swap(false, Ordering::SeqCst) {
            return Vec::new();
        }

        let mut exits = Vec::new();
        loop {
            match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::Exited(pid, code)) => {
                    exits.push(ChildExit { pid: Pid(pid.as_raw()), code: Some(code) });
                },
                Ok(WaitStatus::Signaled(pid, _, _)) => {
                    exits.push(ChildExit { pid: Pid(pid.as_raw()), code: None });
                },
                Ok(WaitStatus::StillAlive) => break,
                // Stop/continue notifications are not requested; skip any
                // that arrive anyway.
                Ok(_) => {},
                Err(Errno::ECHILD) => break,
                Err(Errno::EINTR) => {},
                Err(err) => {
                    tracing::warn!(%err, "waitpid failed");
                    break;
                },
            }
        }
        exits
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}
