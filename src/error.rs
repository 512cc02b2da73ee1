use thiserror::Error;

/// Errors surfaced by the console.
///
/// `Transport` and `Status` are network failures; everything the backend is
/// asked to do can fail with one of those two. The rest are local.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to {context}: server returned {status}")]
    Status { status: u16, context: &'static str },

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("browser: {0}")]
    Browser(#[from] opener::OpenError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to encode logs: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
