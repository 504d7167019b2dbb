//! Resolver configuration.
//!
//! Loaded from an optional `pathalias.toml` file with `PATHALIAS_`
//! environment variable overrides, or constructed directly for embedding.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Configuration for the resolver and its shared caches.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Debounce window for the global flush, in seconds. Repeated flush
    /// requests inside this window collapse into a single heavy
    /// invalidation pass.
    pub flush_debounce_secs: u64,
    /// Whether the first lookup of a request bulk-prefetches the aliases
    /// for all system paths recorded for the current page.
    pub prefetch_enabled: bool,
    /// Settings-store key under which the whitelist snapshot is persisted.
    pub whitelist_key: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            flush_debounce_secs: 10,
            prefetch_enabled: true,
            whitelist_key: "pathalias.whitelist".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Loads configuration from `pathalias.toml` in the working directory
    /// (if present) and `PATHALIAS_*` environment variables.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("pathalias").required(false))
            .add_source(config::Environment::with_prefix("PATHALIAS"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Loads configuration from a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// The flush debounce window as a [`Duration`].
    pub fn flush_debounce(&self) -> Duration {
        Duration::from_secs(self.flush_debounce_secs)
    }
}
