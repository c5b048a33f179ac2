use thiserror::Error;

/// Errors surfaced by document host implementations.
///
/// The tracker itself has no error kinds: an unsupported environment and a
/// change event arriving after teardown are both normal, silently handled
/// states.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Unknown flag '{name}'")]
    UnknownFlag { name: String },

    #[cfg(target_os = "linux")]
    #[error("X11 connection failed: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[cfg(target_os = "linux")]
    #[error("X11 stream error: {0}")]
    Stream(#[from] x11rb::errors::ConnectionError),

    #[cfg(target_os = "linux")]
    #[error("X11 request failed: {0}")]
    Protocol(#[from] x11rb::errors::ReplyError),

    #[cfg(target_os = "linux")]
    #[error("X11 setup did not include the requested screen")]
    NoScreen,

    #[cfg(target_os = "linux")]
    #[error("no active window to attach to")]
    NoActiveWindow,
}
