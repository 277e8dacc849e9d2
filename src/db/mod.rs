//! Database layer for feed-mirror
//!
//! Handles SQLite persistence for mirrored feed items.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`items`] — Stored item writes and aggregate queries
//!
//! ## Single-writer constraint
//!
//! The pool is opened with exactly one connection, so every statement from
//! every task funnels through a single physical writer. Concurrent callers
//! queue on pool acquisition; they block rather than corrupt state.

use crate::types::ItemId;
use sqlx::{FromRow, sqlite::SqlitePool};

mod items;
mod migrations;

/// Stored item record from the database
#[derive(Debug, Clone, FromRow)]
pub struct StoredItem {
    /// Feed-assigned item id (primary key)
    pub id: ItemId,
    /// Raw item payload as received from the feed
    pub data: String,
}

/// Database handle for feed-mirror
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
