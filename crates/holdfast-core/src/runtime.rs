//! The single-threaded event loop.
//!
//! One fixed-order iteration: check shutdown, drain reaped children,
//! compute the event-wait timeout, wait, dispatch (event or tick),
//! execute the resulting actions, flush. The same loop runs in
//! production (X11 backend, OS process host, system clock) and in the
//! simulation harness (scripted backend, fake host, virtual clock).
//!
//! # Blocking
//!
//! `next_event` is the only blocking call, and it blocks with a finite
//! timeout whenever any timer (hold tick, close escalation, respawn
//! delay) is pending. Signal handlers only set flags; everything they
//! imply happens here, at the top of the iteration.

use crate::{
    backend::DisplayBackend,
    clock::Clock,
    error::RuntimeError,
    event::{DisplayEvent, KioskAction},
    session::Session,
    supervisor::ProcessHost,
};

/// Drive the session against a backend and process host until shutdown.
///
/// Returns `Ok(())` when the host reports an external shutdown signal.
///
/// # Errors
///
/// [`RuntimeError::Backend`] when the display connection fails; per-call
/// backend errors and spawn failures are logged and survived.
pub fn run<B, H, C>(
    session: &mut Session<C::Instant>,
    backend: &mut B,
    host: &mut H,
    clock: &C,
) -> Result<(), RuntimeError<B::Error>>
where
    B: DisplayBackend,
    H: ProcessHost,
    C: Clock,
{
    for output in backend.outputs().map_err(RuntimeError::Backend)? {
        let actions = session.process_event(DisplayEvent::OutputAdded { output }, clock.now());
        execute(session, backend, host, clock, actions);
    }

    let actions = session.startup(clock.now());
    execute(session, backend, host, clock, actions);
    flush(backend);

    loop {
        if host.shutdown_requested() {
            tracing::info!("shutdown signal received, exiting");
            return Ok(());
        }

        for exit in host.reap() {
            let actions = session.process_child_exit(exit, clock.now());
            execute(session, backend, host, clock, actions);
        }

        let timeout = session.poll_timeout(clock.now());
        let actions = match backend.next_event(timeout) {
            Ok(Some(event)) => session.process_event(event, clock.now()),
            Ok(None) => session.tick(clock.now()),
            Err(error) => return Err(RuntimeError::Backend(error)),
        };

        execute(session, backend, host, clock, actions);
        flush(backend);
    }
}

/// Execute actions against the backend and host. A failure affecting one
/// surface never stops the remaining actions.
fn execute<B, H, C>(
    session: &mut Session<C::Instant>,
    backend: &mut B,
    host: &mut H,
    clock: &C,
    actions: Vec<KioskAction>,
) where
    B: DisplayBackend,
    H: ProcessHost,
    C: Clock,
{
    for action in actions {
        match action {
            KioskAction::Fullscreen { surface, geometry } => {
                log_surface_call(backend.force_fullscreen(surface, geometry), "force_fullscreen");
            },
            KioskAction::RaiseAndFocus { surface } => {
                log_surface_call(backend.raise_and_focus(surface), "raise_and_focus");
            },
            KioskAction::RequestClose { surface } => {
                log_surface_call(backend.request_close(surface), "request_close");
            },
            KioskAction::ForceDestroy { surface } => {
                log_surface_call(backend.force_destroy(surface), "force_destroy");
            },
            KioskAction::ForwardKey { sym, state } => {
                log_surface_call(backend.forward_key(sym, state), "forward_key");
            },
            KioskAction::SpawnHome { path } => {
                match host.spawn(&path, &backend.connection_env()) {
                    Ok(pid) => session.home_launched(pid, clock.now()),
                    Err(error) => {
                        tracing::warn!(path = %path.display(), %error,
                            "failed to launch home application, will retry");
                        session.home_launch_failed(clock.now());
                    },
                }
            },
        }
    }
}

fn log_surface_call<E: std::error::Error>(result: Result<(), E>, call: &'static str) {
    if let Err(error) = result {
        tracing::warn!(%call, %error, "backend call failed, continuing");
    }
}

fn flush<B: DisplayBackend>(backend: &mut B) {
    if let Err(error) = backend.flush() {
        tracing::warn!(%error, "backend flush failed");
    }
}
