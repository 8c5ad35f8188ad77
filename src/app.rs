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


//! Application facade
//!
//! `LibraryApp` wires configuration, the wishlist database, the catalog
//! client and the search coordinator together. It is the single object the
//! FFI bridge and the CLI hold.
//!
//! Every wishlist mutation made through the facade refreshes the
//! `is_wishlisted` flags of the search results currently shown.

use crate::api::client::{CatalogClient, CatalogSearch, ClientConfig};
use crate::api::covers::CoverSize;
use crate::config::CoreConfig;
use crate::error::{LibraryError, Result};
use crate::search::{SearchCoordinator, SearchState, SearchUpdate, ToggleOutcome, WishlistToggle};
use crate::storage::{BookRecord, Database, MemoryWishlist, SqliteWishlist, WishlistStore};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

pub struct LibraryApp {
    config: CoreConfig,
    client: CatalogClient,
    coordinator: SearchCoordinator,
    database: Option<Database>,
}

impl LibraryApp {
    /// Open the app with a persistent wishlist
    ///
    /// Uses `config.database_path`, or the platform default when unset.
    pub async fn open(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let path = config
            .database_path
            .clone()
            .unwrap_or_else(Database::get_default_path);
        let database = Database::new(&path).await?;
        let wishlist: Arc<dyn WishlistStore> = Arc::new(SqliteWishlist::new(database.clone()));

        let client = CatalogClient::with_config(ClientConfig::from(&config))?;
        let catalog: Arc<dyn CatalogSearch> = Arc::new(client.clone());

        info!(path = %path.display(), "Library app opened");
        Self::assemble(config, client, catalog, wishlist, Some(database))
    }

    /// Open the app with a process-local wishlist
    pub async fn in_memory(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let client = CatalogClient::with_config(ClientConfig::from(&config))?;
        let catalog: Arc<dyn CatalogSearch> = Arc::new(client.clone());

        Self::assemble(config, client, catalog, Arc::new(MemoryWishlist::new()), None)
    }

    /// Build from explicit parts, e.g. a fake catalog in tests
    pub fn with_parts(
        config: CoreConfig,
        catalog: Arc<dyn CatalogSearch>,
        wishlist: Arc<dyn WishlistStore>,
    ) -> Result<Self> {
        config.validate()?;
        let client = CatalogClient::with_config(ClientConfig::from(&config))?;
        Self::assemble(config, client, catalog, wishlist, None)
    }

    fn assemble(
        config: CoreConfig,
        client: CatalogClient,
        catalog: Arc<dyn CatalogSearch>,
        wishlist: Arc<dyn WishlistStore>,
        database: Option<Database>,
    ) -> Result<Self> {
        let coordinator = SearchCoordinator::with_debounce(catalog, wishlist, config.debounce())?;
        Ok(Self {
            config,
            client,
            coordinator,
            database,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &SearchCoordinator {
        &self.coordinator
    }

    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    fn wishlist(&self) -> &dyn WishlistStore {
        self.coordinator.wishlist().as_ref()
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    pub fn set_query(&self, text: &str) {
        self.coordinator.set_query(text);
    }

    pub fn clear_query(&self) {
        self.coordinator.clear();
    }

    pub async fn toggle_cover_filter(&self) -> bool {
        self.coordinator.toggle_cover_filter().await
    }

    pub async fn set_cover_filter(&self, enabled: bool) -> bool {
        self.coordinator.set_cover_filter(enabled).await
    }

    pub fn current_search(&self) -> SearchUpdate {
        self.coordinator.snapshot()
    }

    pub fn subscribe(&self) -> UnboundedReceiver<SearchUpdate> {
        self.coordinator.subscribe()
    }

    pub async fn refresh_search(&self) -> Result<()> {
        self.coordinator.refresh_wishlist_flags().await
    }

    /// Set the query and wait for the search to settle
    ///
    /// Returns the first update for `text` that is not `PerformingSearch`.
    pub async fn search(&self, text: &str) -> Result<SearchUpdate> {
        let mut rx = self.coordinator.subscribe();
        let query = text.trim();
        self.coordinator.set_query(text);

        while let Some(update) = rx.recv().await {
            if update.query != query {
                // Superseded by another caller
                return Err(LibraryError::Cancelled);
            }
            if update.state != SearchState::PerformingSearch {
                return Ok(update);
            }
        }

        Err(LibraryError::Cancelled)
    }

    // ========================================================================
    // WISHLIST
    // ========================================================================

    pub async fn wishlist_list(&self) -> Result<Vec<BookRecord>> {
        self.wishlist().list().await
    }

    pub async fn wishlist_contains(&self, key: &str) -> Result<bool> {
        self.wishlist().contains(key).await
    }

    pub async fn wishlist_count(&self) -> Result<usize> {
        self.wishlist().count().await
    }

    /// Add a record, refreshing the shown search flags when it was new
    ///
    /// The mutations below only fail when the store does; a failed refresh
    /// afterwards is logged by the coordinator.
    pub async fn wishlist_add(&self, record: &BookRecord) -> Result<bool> {
        let added = self.wishlist().add(record).await?;
        if added {
            self.coordinator.wishlist_changed().await;
        }
        Ok(added)
    }

    pub async fn wishlist_remove(&self, key: &str) -> Result<bool> {
        let removed = self.wishlist().remove(key).await?;
        if removed {
            self.coordinator.wishlist_changed().await;
        }
        Ok(removed)
    }

    pub async fn wishlist_remove_at(&self, index: usize) -> Result<Option<BookRecord>> {
        let removed = self.wishlist().remove_at(index).await?;
        if removed.is_some() {
            self.coordinator.wishlist_changed().await;
        }
        Ok(removed)
    }

    pub async fn wishlist_clear(&self) -> Result<usize> {
        let removed = self.wishlist().clear().await?;
        if removed > 0 {
            self.coordinator.wishlist_changed().await;
        }
        Ok(removed)
    }

    /// Commit the net effect of a detail screen session
    ///
    /// `changed` is whether the user left the button in the opposite state
    /// from the one the record was shown with.
    pub async fn commit_wishlist_change(&self, record: BookRecord, changed: bool) -> Result<ToggleOutcome> {
        let mut toggle = WishlistToggle::new(record);
        if changed {
            toggle.toggle();
        }
        self.coordinator.commit_toggle(toggle).await
    }

    // ========================================================================
    // COVERS
    // ========================================================================

    pub fn cover_url(&self, cover_id: &str, size: CoverSize) -> String {
        self.client.cover_url(cover_id, size)
    }

    pub async fn fetch_cover(&self, cover_id: &str, size: CoverSize) -> Result<Vec<u8>> {
        self.client.fetch_cover(cover_id, size).await
    }

    /// Release the database, if any
    pub async fn close(self) -> Result<()> {
        if let Some(db) = self.database {
            db.close().await?;
        }
        Ok(())
    }
}
