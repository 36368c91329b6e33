//! Error types for the calsync crates.

use thiserror::Error;

/// Errors that can occur during a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The feed credential needs interactive reauthorization before
    /// another attempt can succeed. Carries the opaque recovery payload
    /// (the consent URL) for the host to hand off.
    #[error("Authorization required: {recovery}")]
    AuthRequired { recovery: String },

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
