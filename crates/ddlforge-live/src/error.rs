//! Error types for live-schema reading and batch execution.

/// Errors that can occur while reading a live schema or executing a batch.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// Database error from the driver.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Rendering or model error from the core.
    #[error(transparent)]
    Ddl(#[from] ddlforge_core::error::DdlError),
}

/// Result type for live operations.
pub type Result<T> = std::result::Result<T, LiveError>;
