use thiserror::Error;

/// Custom error types for upmix
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoder binary not found")]
    EncoderNotFound,

    #[error("not ready to start: {0}")]
    NotReady(String),

    #[error("busy: {0}")]
    Busy(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("encoder process failed: {0}")]
    ProcessFailed(String),

    #[error("conversion cancelled")]
    Cancelled,

    #[error("invalid path: {0}")]
    PathError(String),

    #[error("resource token error: {0}")]
    TokenError(String),

    #[error("notification error: {0}")]
    NotificationFailed(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for upmix operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
