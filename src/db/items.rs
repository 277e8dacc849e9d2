//! Stored item writes and aggregate queries.

use crate::error::StoreError;
use crate::types::ItemId;
use crate::{Error, Result};

use super::{Database, StoredItem};

impl Database {
    /// Persist one item
    ///
    /// Inserts are strict: writing an id that already exists violates the
    /// primary key and surfaces as [`StoreError::Persist`]. The resume
    /// calculator never hands out an already-stored id, so a violation here
    /// means a caller bug rather than normal operation.
    pub async fn insert_item(&self, id: ItemId, data: &str) -> Result<()> {
        sqlx::query("INSERT INTO items (id, data) VALUES (?, ?)")
            .bind(id)
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Store(StoreError::Persist {
                    id,
                    reason: e.to_string(),
                })
            })?;

        Ok(())
    }

    /// Total number of stored items
    pub async fn count_items(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Store(StoreError::Scan(format!(
                    "Failed to count items: {}",
                    e
                )))
            })?;

        Ok(count)
    }

    /// Maximum stored item id, or `None` when the store is empty
    pub async fn max_item_id(&self) -> Result<Option<ItemId>> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(id) FROM items")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Store(StoreError::Scan(format!(
                    "Failed to query max item id: {}",
                    e
                )))
            })?;

        Ok(max.map(ItemId))
    }

    /// Fetch one stored item by id
    pub async fn get_item(&self, id: ItemId) -> Result<Option<StoredItem>> {
        let item = sqlx::query_as::<_, StoredItem>("SELECT id, data FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                Error::Store(StoreError::Scan(format!(
                    "Failed to fetch item {}: {}",
                    id, e
                )))
            })?;

        Ok(item)
    }
}
