use thiserror::Error;

/// Core error types for pathalias operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid alias record: {message}")]
    InvalidRecord { message: String },

    #[error("Record has no id: {source_path} -> {alias}")]
    MissingId { source_path: String, alias: String },
}

impl CoreError {
    /// Create a new InvalidPath error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create a new InvalidRecord error
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Create a new MissingId error
    pub fn missing_id(source_path: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::MissingId {
            source_path: source_path.into(),
            alias: alias.into(),
        }
    }

    /// Check if this error is a validation error (caller supplied bad data)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath(_) | Self::InvalidRecord { .. } | Self::MissingId { .. }
        )
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
