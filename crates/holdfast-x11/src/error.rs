//! Errors of the stacking-protocol adapter.

use holdfast_core::KeySym;
use thiserror::Error;

/// Failures talking to the X server.
///
/// `Connect` and `AlreadyManaged` only occur during adapter construction
/// and are fatal startup errors. The rest surface through the
/// [`DisplayBackend`](holdfast_core::DisplayBackend) calls, where the run
/// loop decides what is fatal (event-wait failures) and what is survivable
/// (per-surface request failures).
#[derive(Error, Debug)]
pub enum X11Error {
    /// Could not open the display connection.
    #[error("cannot open display: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    /// Another window manager already owns substructure redirection on
    /// the root window.
    #[error("another window manager already owns the display")]
    AlreadyManaged,

    /// The display connection failed mid-session.
    #[error("display connection failed: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    /// A protocol request was answered with an error.
    #[error("protocol request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    /// Waiting on the connection descriptor failed.
    #[error("event wait failed: {0}")]
    Poll(#[from] nix::Error),

    /// The configured hotkey is not on the current keyboard map.
    #[error("hotkey keysym {0} has no keycode in the current keyboard mapping")]
    HotkeyUnmapped(KeySym),
}
