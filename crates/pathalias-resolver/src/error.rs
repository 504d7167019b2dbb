//! Error types for resolver operations.

use thiserror::Error;

use pathalias_core::CoreError;
use pathalias_storage::StorageError;

/// Errors surfaced by the resolver.
///
/// Only primary-store and validation failures reach callers: secondary
/// cache-store errors are logged and recovered by falling back to the
/// primary, never propagated.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The authoritative store failed; resolution cannot proceed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The caller supplied an invalid record or path.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl ResolveError {
    /// Returns `true` if this error stems from caller-supplied data.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Invalid(_) => true,
            Self::Storage(err) => {
                matches!(err, StorageError::InvalidRecord { .. })
            }
            Self::Config(_) => false,
        }
    }
}

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
