//! # pathalias-db-memory
//!
//! In-memory implementation of the [`pathalias_storage::AliasStorage`]
//! contract, backed by a lock-free `papaya::HashMap`.
//!
//! This is the reference backend: it is used directly in tests as both the
//! system-of-record store and the secondary cache store, and it documents
//! the expected semantics for real durable backends.

mod storage;

pub use storage::InMemoryAliasStorage;
