//! Fatal run-loop errors.
//!
//! Almost nothing in the kiosk is allowed to be fatal: per-surface
//! backend failures, spawn failures, and protocol races are all logged
//! and survived. What remains fatal is losing the display itself.

use thiserror::Error;

/// Errors that end the run loop.
#[derive(Error, Debug)]
pub enum RuntimeError<B>
where
    B: std::error::Error,
{
    /// The display connection failed while waiting for events or during
    /// startup enumeration.
    #[error("display backend failure: {0}")]
    Backend(B),
}
