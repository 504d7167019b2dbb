//! # pathalias-storage
//!
//! Storage abstraction layer for the pathalias engine.
//!
//! This crate defines the traits and types that all alias storage backends
//! must implement. It does not contain any implementations - those are
//! provided by separate crates such as `pathalias-db-memory`.
//!
//! ## Overview
//!
//! The main trait is [`AliasStorage`], which defines the contract for:
//! - Filtered single-record loads and language-fallback lookups
//! - Upserts with backend-assigned ids
//! - The whitelist query (distinct first segments)
//! - Ordered traversal for the import/sync job
//!
//! Two interchangeable backends are expected behind this contract: one
//! durable and authoritative (the system of record) and one fast and
//! best-effort (the cache store). The resolver decides which to ask and how
//! to fall back; backends only promise identical operation semantics.
//!
//! ## Example
//!
//! ```ignore
//! use pathalias_core::Language;
//! use pathalias_storage::{AliasStorage, StorageError};
//!
//! async fn alias_for(storage: &dyn AliasStorage, path: &str) -> Result<Option<String>, StorageError> {
//!     let found = storage.lookup_alias(path, &Language::neutral()).await?;
//!     Ok(found.map(|record| record.alias))
//! }
//! ```

mod error;
pub mod sync;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use sync::sync_backends;
pub use traits::AliasStorage;
pub use types::AliasFilter;

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared storage trait object.
pub type DynAliasStorage = std::sync::Arc<dyn AliasStorage>;
