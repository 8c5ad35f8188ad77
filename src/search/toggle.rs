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


//! Wishlist toggle
//!
//! The detail screen lets the user flip the wishlist button any number of
//! times; only the net effect is written when the screen is left.

use crate::error::Result;
use crate::storage::models::BookRecord;
use crate::storage::wishlist::WishlistStore;
use serde::{Deserialize, Serialize};

/// What a commit did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
    Unchanged,
}

impl ToggleOutcome {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, ToggleOutcome::Unchanged)
    }
}

/// Pending wishlist change for one record
#[derive(Debug, Clone)]
pub struct WishlistToggle {
    record: BookRecord,
    original: bool,
    changed: bool,
}

impl WishlistToggle {
    pub fn new(record: BookRecord) -> Self {
        let original = record.is_wishlisted;
        Self {
            record,
            original,
            changed: false,
        }
    }

    /// Flip the pending change, returning the state the button should show
    pub fn toggle(&mut self) -> bool {
        self.changed = !self.changed;
        self.target()
    }

    /// Displayed wishlist state
    pub fn target(&self) -> bool {
        self.original ^ self.changed
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn record(&self) -> &BookRecord {
        &self.record
    }

    /// Write the net effect to `store`
    ///
    /// No store call is made when the toggle count is even.
    pub async fn commit(self, store: &dyn WishlistStore) -> Result<ToggleOutcome> {
        if !self.changed {
            return Ok(ToggleOutcome::Unchanged);
        }

        if self.original {
            store.remove(&self.record.key).await?;
            Ok(ToggleOutcome::Removed)
        } else {
            store.add(&self.record).await?;
            Ok(ToggleOutcome::Added)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::search::RawSearchResult;
    use crate::storage::wishlist::MemoryWishlist;

    fn record(key: &str, wishlisted: bool) -> BookRecord {
        BookRecord::from_raw(&RawSearchResult::new(key), wishlisted)
    }

    #[test]
    fn test_toggle_reports_target() {
        let mut toggle = WishlistToggle::new(record("k1", false));
        assert!(!toggle.target());
        assert!(toggle.toggle());
        assert!(!toggle.toggle());
        assert!(!toggle.is_changed());
    }

    #[tokio::test]
    async fn test_commit_adds() {
        let store = MemoryWishlist::new();
        let mut toggle = WishlistToggle::new(record("k1", false));
        toggle.toggle();

        let outcome = toggle.commit(&store).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Added);
        assert!(store.contains("k1").await.unwrap());
    }

    #[tokio::test]
    async fn test_commit_removes() {
        let store = MemoryWishlist::new();
        store.add(&record("k1", false)).await.unwrap();

        let mut toggle = WishlistToggle::new(record("k1", true));
        toggle.toggle();

        assert_eq!(toggle.commit(&store).await.unwrap(), ToggleOutcome::Removed);
        assert!(!store.contains("k1").await.unwrap());
    }

    #[tokio::test]
    async fn test_even_toggles_leave_store_alone() {
        let store = MemoryWishlist::new();
        let mut toggle = WishlistToggle::new(record("k1", false));
        toggle.toggle();
        toggle.toggle();

        let outcome = toggle.commit(&store).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Unchanged);
        assert!(!outcome.is_mutation());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
