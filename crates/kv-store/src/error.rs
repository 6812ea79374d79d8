//! Error types for store operations

/// Errors from the backing key-value store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("store connection failed: {0}")]
    Connect(String),

    #[error("store command {command} failed: {message}")]
    Command {
        command: &'static str,
        message: String,
    },
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;
