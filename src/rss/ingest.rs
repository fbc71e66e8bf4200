//! Idempotent post ingestion.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::GatorError;
use crate::rss::normalize::normalize_item;
use crate::rss::repository::PostRepository;
use crate::rss::types::RssItem;

/// Outcome of ingesting one batch of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Newly stored posts.
    pub inserted: usize,
    /// Items whose URL was already stored.
    pub duplicates: usize,
    /// Items that could not be stored for any other reason.
    pub failed: usize,
}

impl IngestReport {
    /// Total number of items seen.
    pub fn total(&self) -> usize {
        self.inserted + self.duplicates + self.failed
    }
}

/// Normalize and store `items` for `feed_id`.
///
/// Items already stored are counted as duplicates. Any other per-item
/// failure is logged and counted; the rest of the batch still runs.
pub async fn ingest_items(pool: &DbPool, feed_id: Uuid, items: &[RssItem]) -> IngestReport {
    let repo = PostRepository::new(pool);
    let mut report = IngestReport::default();

    for item in items {
        let result = match normalize_item(item, feed_id) {
            Ok(post) => repo.create(&post).await.map(|_| ()),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => report.inserted += 1,
            Err(GatorError::Duplicate(_)) => {
                debug!(url = %item.link, "post already stored");
                report.duplicates += 1;
            }
            Err(e) => {
                warn!(url = %item.link, error = %e, "failed to store post");
                report.failed += 1;
            }
        }
    }

    report
}
