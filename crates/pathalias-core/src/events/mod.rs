//! Unified alias-change event system.
//!
//! The resolver broadcasts an [`AliasEvent`] after every successful write so
//! external listeners (search re-indexers, sitemap builders) can react
//! without polling storage.

mod broadcaster;
mod types;

pub use broadcaster::EventBroadcaster;
pub use types::{AliasEvent, AliasEventType};
