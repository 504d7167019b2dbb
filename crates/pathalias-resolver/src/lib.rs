//! # pathalias-resolver
//!
//! The alias resolution engine: converts internal system paths to their
//! public aliases (and back) across languages, while keeping resolution
//! cheap under heavy repeated traffic and a large alias table.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────── ResolverContext (process-wide) ───────────────┐
//! │  primary store      cache store (optional, best-effort)               │
//! │  WhitelistCache     FlushCoordinator     PrefetchPathCache            │
//! │  SettingsStore      EventBroadcaster                                  │
//! └──────────────────────────────┬────────────────────────────────────────┘
//!                                │ new_request()
//!                    ┌───────────▼───────────┐
//!                    │ AliasResolver          │   one per inbound request
//!                    │   RequestCache         │   (session-scoped memory)
//!                    └────────────────────────┘
//! ```
//!
//! A lookup first consults the request-scoped cache, then the whitelist of
//! first path segments (skipping storage entirely for paths that can never
//! have an alias), and only then issues a single storage query with the
//! language-fallback ordering. Writes go durably to the primary store,
//! best-effort to the cache store, and invalidate every derived cache layer.

pub mod config;
pub mod error;
pub mod flush;
pub mod prefetch;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod whitelist;

pub use config::ResolverConfig;
pub use error::{ResolveError, Result};
pub use flush::FlushCoordinator;
pub use prefetch::{MemoryPrefetchCache, PrefetchPathCache};
pub use resolver::{AliasResolver, ResolverContext};
pub use session::RequestCache;
pub use settings::{MemorySettings, SettingsStore};
pub use whitelist::WhitelistCache;
