//! # pathalias-core
//!
//! Core types for the pathalias resolution engine: the [`AliasRecord`] data
//! unit, the [`Language`] code with its neutral sentinel and legacy fallback
//! ordering, path segment helpers, and the alias-change event system.
//!
//! This crate contains no storage or resolution logic - those live in
//! `pathalias-storage` and `pathalias-resolver`.

pub mod error;
pub mod events;
pub mod language;
pub mod path;
pub mod record;

pub use error::{CoreError, Result};
pub use events::{AliasEvent, AliasEventType, EventBroadcaster};
pub use language::{Language, NEUTRAL_CODE, best_match, compare_candidates, is_candidate};
pub use path::first_segment;
pub use record::{AliasId, AliasRecord};
