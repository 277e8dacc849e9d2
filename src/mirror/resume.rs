//! Resume range computation.

use crate::error::Result;
use crate::types::{ItemId, ItemRange};

use super::Mirror;

impl Mirror {
    /// Compute the contiguous range of ids to fetch in this run
    ///
    /// `first` is one past the highest id already stored (1 for an empty
    /// store); `last` is the highest id the feed currently knows. The range
    /// is computed once, before any concurrent work starts, and is not
    /// recomputed mid-run — items posted while a run is in flight are picked
    /// up by the next run.
    ///
    /// An up-to-date store yields an empty range (`first > last`), which the
    /// downloader treats as an immediate successful no-op.
    pub async fn resume_range(&self) -> Result<ItemRange> {
        let last_downloaded = if self.db.count_items().await? == 0 {
            ItemId(0)
        } else {
            // MAX(id) is only meaningful on a non-empty store
            self.db.max_item_id().await?.unwrap_or(ItemId(0))
        };

        let last_posted = self.source.max_item_id().await?;

        Ok(ItemRange::new(last_downloaded.next(), last_posted))
    }
}
