//! One-shot batch copy of alias records between two backends.
//!
//! Drives the [`AliasStorage::records_after`] traversal on the source
//! backend and replays each record into the destination, which assigns its
//! own ids. Typically used to (re)populate the secondary cache store from
//! the system of record after `clear()`.

use tracing::{debug, info};

use crate::error::StorageError;
use crate::traits::AliasStorage;

/// Default page size for the traversal.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Copies every record from `src` into `dst`, preserving `source`, `alias`
/// and `language` and letting the destination assign new ids.
///
/// Returns the number of records copied. The traversal is restartable in
/// id order, so a repeated run after a partial failure re-copies from the
/// beginning only if the destination was cleared first; this job does not
/// deduplicate.
///
/// # Errors
///
/// Propagates the first error from either backend. There is no partial
/// rollback: records copied before the failure stay in the destination.
pub async fn sync_backends(
    src: &dyn AliasStorage,
    dst: &dyn AliasStorage,
    batch_size: usize,
) -> Result<u64, StorageError> {
    let batch_size = batch_size.max(1);
    let mut copied: u64 = 0;
    let mut last_id = 0;

    loop {
        let page = src.records_after(last_id, batch_size).await?;
        if page.is_empty() {
            break;
        }
        debug!(
            from = src.backend_name(),
            to = dst.backend_name(),
            after = last_id,
            count = page.len(),
            "Copying alias batch"
        );
        for record in page {
            let Some(id) = record.id else {
                // records_after only yields saved records
                continue;
            };
            last_id = id;
            let mut fresh = record;
            fresh.id = None;
            dst.save(&mut fresh).await?;
            copied += 1;
        }
    }

    info!(
        from = src.backend_name(),
        to = dst.backend_name(),
        copied,
        "Alias backend sync complete"
    );
    Ok(copied)
}
