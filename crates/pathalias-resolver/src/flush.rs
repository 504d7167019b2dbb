//! Stampede-safe global cache flush.
//!
//! A full flush of the derived caches is expensive; under high concurrency
//! every request deciding to flush at once would thunder the storage layer.
//! Instead a flush is requested by writing a timestamp marker, and some
//! later request performs the heavy step once the marker has aged past the
//! debounce window. Taking the marker is an atomic remove, so at most one
//! in-process runner wins; across processes the invalidation is idempotent
//! and duplicated work is tolerated over any locking.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::prefetch::PrefetchPathCache;
use crate::settings::SettingsStore;

/// Settings key holding the pending flush request timestamp.
pub const FLUSH_REQUESTED_KEY: &str = "pathalias.flush_requested_at";
/// Settings key holding the completion timestamp of the last flush.
pub const FLUSH_COMPLETED_KEY: &str = "pathalias.flush_completed_at";

/// Coordinates the debounced global flush through the settings store.
pub struct FlushCoordinator {
    settings: Arc<dyn SettingsStore>,
    window: Duration,
}

impl FlushCoordinator {
    /// Creates a coordinator with the given debounce window.
    pub fn new(settings: Arc<dyn SettingsStore>, window: Duration) -> Self {
        Self { settings, window }
    }

    /// Requests a global flush.
    ///
    /// A no-op while a request is already pending, and while the debounce
    /// window since the last completed flush has not yet elapsed - a
    /// completed flush arms a fresh window before another may be requested.
    pub fn request_flush(&self) {
        if self.is_flush_pending() {
            return;
        }
        let now = now_unix();
        if let Some(completed) = self.timestamp(FLUSH_COMPLETED_KEY)
            && now - completed < self.window_secs()
        {
            return;
        }
        debug!(requested_at = now, "Alias cache flush requested");
        self.settings.set(FLUSH_REQUESTED_KEY, now.to_string());
    }

    /// Returns `true` if a flush request is pending.
    pub fn is_flush_pending(&self) -> bool {
        self.flush_timestamp().is_some()
    }

    /// Returns the pending flush request timestamp (unix seconds), if any.
    /// Exposed so the outer scheduler can decide whether to run the
    /// debounced step this request.
    pub fn flush_timestamp(&self) -> Option<i64> {
        self.timestamp(FLUSH_REQUESTED_KEY)
    }

    /// Performs the heavy invalidation when the pending marker has aged
    /// past the debounce window.
    ///
    /// Returns `true` only for the caller that actually ran the flush. Of
    /// N concurrent requests inside the window, exactly one in-process
    /// caller takes the marker; the rest see `false`.
    pub fn run_pending(&self, prefetch: &dyn PrefetchPathCache) -> bool {
        let Some(requested) = self.flush_timestamp() else {
            return false;
        };
        let now = now_unix();
        if now - requested < self.window_secs() {
            return false;
        }
        // Take the marker atomically; losers bail out here.
        if self.settings.remove(FLUSH_REQUESTED_KEY).is_none() {
            return false;
        }

        prefetch.clear();
        self.settings.set(FLUSH_COMPLETED_KEY, now.to_string());
        info!(requested_at = requested, "Alias caches flushed");
        true
    }

    fn timestamp(&self, key: &str) -> Option<i64> {
        self.settings.get(key).and_then(|raw| raw.parse().ok())
    }

    fn window_secs(&self) -> i64 {
        self.window.as_secs() as i64
    }
}

fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

impl std::fmt::Debug for FlushCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushCoordinator")
            .field("window", &self.window)
            .field("pending", &self.is_flush_pending())
            .finish()
    }
}
