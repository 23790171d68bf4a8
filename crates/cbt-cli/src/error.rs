//! Error types for cbt-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from cbt-aggregate
    #[error(transparent)]
    Aggregate(#[from] cbt_aggregate::Error),

    /// Error from cbt-msbuild
    #[error(transparent)]
    Msbuild(#[from] cbt_msbuild::Error),

    /// Error from cbt-fs
    #[error(transparent)]
    Fs(#[from] cbt_fs::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The tracing subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
