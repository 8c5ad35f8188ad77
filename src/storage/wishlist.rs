// OpenLibrary Search - Book Search and Wishlist Core
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Wishlist store
//!
//! Plain CRUD interface keyed by catalog key. Stores never notify anyone;
//! whoever mutates a store is responsible for recomputing the records it
//! shows (see `SearchCoordinator::commit_toggle`).
//!
//! # Implementations
//! - `SqliteWishlist` - persistent, survives restarts
//! - `MemoryWishlist` - process-local, used by tests and the FFI fallback

use crate::error::Result;
use crate::storage::database::Database;
use crate::storage::models::BookRecord;
use crate::storage::queries;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Persisted collection of book records, ordered by insertion
#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// All records in insertion order
    async fn list(&self) -> Result<Vec<BookRecord>>;

    async fn contains(&self, key: &str) -> Result<bool>;

    /// Catalog keys in insertion order
    async fn keys(&self) -> Result<Vec<String>>;

    async fn count(&self) -> Result<usize>;

    /// Insert a copy of `record` with `is_wishlisted = true`
    ///
    /// Returns `false` without touching the store if the key is present.
    async fn add(&self, record: &BookRecord) -> Result<bool>;

    /// Returns `false` if the key was not present
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Remove the record at `index` in `list()` order
    ///
    /// Returns `None` when the index is out of range.
    async fn remove_at(&self, index: usize) -> Result<Option<BookRecord>>;

    /// Remove everything, returning the number of records removed
    async fn clear(&self) -> Result<usize>;
}

fn wishlisted_copy(record: &BookRecord) -> BookRecord {
    BookRecord {
        is_wishlisted: true,
        ..record.clone()
    }
}

// ============================================================================
// SQLITE
// ============================================================================

/// Wishlist backed by the `Wishlist` table
#[derive(Debug, Clone)]
pub struct SqliteWishlist {
    db: Database,
}

impl SqliteWishlist {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl WishlistStore for SqliteWishlist {
    async fn list(&self) -> Result<Vec<BookRecord>> {
        let rows = queries::list_wishlist_books(self.db.pool()).await?;
        queries::rows_into_records(rows)
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(queries::find_wishlist_book(self.db.pool(), key).await?.is_some())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        queries::list_wishlist_keys(self.db.pool()).await
    }

    async fn count(&self) -> Result<usize> {
        let count = queries::count_wishlist_books(self.db.pool()).await?;
        Ok(count.max(0) as usize)
    }

    async fn add(&self, record: &BookRecord) -> Result<bool> {
        let inserted = queries::insert_wishlist_book(self.db.pool(), &wishlisted_copy(record)).await?;
        if inserted {
            info!(key = %record.key, "Added book to wishlist");
        } else {
            debug!(key = %record.key, "Book already wishlisted");
        }
        Ok(inserted)
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let removed = queries::delete_wishlist_book(self.db.pool(), key).await?;
        if removed {
            info!(key, "Removed book from wishlist");
        }
        Ok(removed)
    }

    async fn remove_at(&self, index: usize) -> Result<Option<BookRecord>> {
        // SQLite reads a negative OFFSET as zero
        let Ok(offset) = i64::try_from(index) else {
            return Ok(None);
        };

        let mut tx = self.db.pool().begin().await?;

        let Some(row) = queries::find_wishlist_book_at(&mut *tx, offset).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        queries::delete_wishlist_book(&mut *tx, &row.book_key).await?;
        tx.commit().await?;

        info!(key = %row.book_key, index, "Removed book from wishlist by position");
        row.into_record().map(Some)
    }

    async fn clear(&self) -> Result<usize> {
        let removed = queries::clear_wishlist(self.db.pool()).await?;
        info!(removed, "Cleared wishlist");
        Ok(removed as usize)
    }
}

// ============================================================================
// MEMORY
// ============================================================================

/// Process-local wishlist
#[derive(Debug, Default)]
pub struct MemoryWishlist {
    records: RwLock<Vec<BookRecord>>,
}

impl MemoryWishlist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WishlistStore for MemoryWishlist {
    async fn list(&self) -> Result<Vec<BookRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.records.read().await.iter().any(|r| r.key == key))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.records.read().await.iter().map(|r| r.key.clone()).collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }

    async fn add(&self, record: &BookRecord) -> Result<bool> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.key == record.key) {
            return Ok(false);
        }
        records.push(wishlisted_copy(record));
        Ok(true)
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        match records.iter().position(|r| r.key == key) {
            Some(index) => {
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_at(&self, index: usize) -> Result<Option<BookRecord>> {
        let mut records = self.records.write().await;
        if index < records.len() {
            Ok(Some(records.remove(index)))
        } else {
            Ok(None)
        }
    }

    async fn clear(&self) -> Result<usize> {
        let mut records = self.records.write().await;
        let removed = records.len();
        records.clear();
        Ok(removed)
    }
}
