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


//! Search coordinator
//!
//! Turns keystrokes into search screen states.
//!
//! # Flow
//! 1. `set_query` cancels whatever is pending, drops the last result set and
//!    emits `PerformingSearch` (or `NoSearchEntry` for empty input)
//! 2. A task sleeps for the debounce interval, then queries the catalog and
//!    reads the wishlist keys
//! 3. The result is applied only if no newer `set_query` happened meanwhile
//!
//! All state lives behind one mutex that is never held across an `.await`;
//! every transition and every emission happens under it, so subscribers see
//! one ordered timeline.

use crate::api::client::CatalogSearch;
use crate::api::search::RawSearchResult;
use crate::config::DEFAULT_DEBOUNCE_MS;
use crate::error::{LibraryError, Result};
use crate::search::state::{SearchState, SearchUpdate};
use crate::search::toggle::{ToggleOutcome, WishlistToggle};
use crate::storage::models::BookRecord;
use crate::storage::wishlist::WishlistStore;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Debounced search over a catalog, reconciled with a wishlist
pub struct SearchCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: Arc<dyn CatalogSearch>,
    wishlist: Arc<dyn WishlistStore>,
    debounce: Duration,
    runtime: Handle,
    state: Mutex<CoordinatorState>,
}

#[derive(Default)]
struct CoordinatorState {
    state: SearchState,
    query: String,
    cover_filter: bool,
    /// Last raw result set; `None` after a reset or a failed search
    raw_results: Option<Vec<RawSearchResult>>,
    records: Vec<BookRecord>,
    /// Bumped on every `set_query`
    generation: u64,
    /// Bumped after every wishlist mutation; flags derived from keys read
    /// under an older epoch are never shown
    wishlist_epoch: u64,
    pending: Option<JoinHandle<()>>,
    subscribers: Vec<UnboundedSender<SearchUpdate>>,
}

/// How a finished search task ended
enum SearchOutcome {
    Found(Vec<RawSearchResult>, HashSet<String>),
    CatalogFailed(LibraryError),
    StoreFailed(LibraryError),
}

impl CoordinatorState {
    fn snapshot(&self) -> SearchUpdate {
        SearchUpdate {
            state: self.state,
            records: self.records.clone(),
            query: self.query.clone(),
            cover_filter: self.cover_filter,
        }
    }

    fn emit(&mut self) {
        let update = self.snapshot();
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }

    fn transition(&mut self, state: SearchState, records: Vec<BookRecord>) {
        self.state = state;
        self.records = records;
        self.emit();
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// A filter or flag recompute may use the held raw set
    fn can_recompute(&self, generation: u64) -> bool {
        self.generation == generation && self.raw_results.is_some() && self.pending.is_none()
    }

    /// Recompute shown records from held raw results and fresh wishlist keys
    fn apply_filtered(&mut self, keys: Result<HashSet<String>>) {
        match keys {
            Ok(keys) => {
                let records = match self.raw_results.as_deref() {
                    Some(raw) => derive_records(raw, &keys, self.cover_filter),
                    None => return,
                };
                let state = if records.is_empty() {
                    SearchState::NoSearchEntry
                } else {
                    SearchState::ResultsFound
                };
                self.transition(state, records);
            }
            Err(e) => {
                error!(error = %e, "Failed to read wishlist while filtering results");
                self.raw_results = None;
                self.transition(SearchState::ZeroResults, Vec::new());
            }
        }
    }
}

impl SearchCoordinator {
    /// Create a coordinator with the default 300 ms debounce
    ///
    /// Must be called from within a Tokio runtime; search tasks are spawned
    /// on that runtime.
    pub fn new(catalog: Arc<dyn CatalogSearch>, wishlist: Arc<dyn WishlistStore>) -> Result<Self> {
        Self::with_debounce(catalog, wishlist, Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }

    pub fn with_debounce(
        catalog: Arc<dyn CatalogSearch>,
        wishlist: Arc<dyn WishlistStore>,
        debounce: Duration,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            LibraryError::InvalidState(format!("SearchCoordinator needs a Tokio runtime: {}", e))
        })?;

        Ok(Self {
            inner: Arc::new(Inner {
                catalog,
                wishlist,
                debounce,
                runtime,
                state: Mutex::new(CoordinatorState::default()),
            }),
        })
    }

    pub fn wishlist(&self) -> &Arc<dyn WishlistStore> {
        &self.inner.wishlist
    }

    pub fn debounce(&self) -> Duration {
        self.inner.debounce
    }

    /// Register an observer
    ///
    /// The receiver gets every update emitted from now on, in order. Dropping
    /// it unregisters the observer.
    pub fn subscribe(&self) -> UnboundedReceiver<SearchUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().subscribers.push(tx);
        rx
    }

    pub fn snapshot(&self) -> SearchUpdate {
        self.inner.lock().snapshot()
    }

    pub fn state(&self) -> SearchState {
        self.inner.lock().state
    }

    pub fn records(&self) -> Vec<BookRecord> {
        self.inner.lock().records.clone()
    }

    pub fn cover_filter(&self) -> bool {
        self.inner.lock().cover_filter
    }

    /// Handle new search text
    ///
    /// Always a hard reset: the pending search is cancelled and the last
    /// result set is discarded, even if the text did not change.
    pub fn set_query(&self, text: &str) {
        let query = text.trim().to_string();
        let mut st = self.inner.lock();

        st.cancel_pending();
        st.generation = st.generation.wrapping_add(1);
        st.raw_results = None;
        st.query = query.clone();

        if query.is_empty() {
            debug!("Search text cleared");
            st.transition(SearchState::NoSearchEntry, Vec::new());
            return;
        }

        st.transition(SearchState::PerformingSearch, Vec::new());

        let generation = st.generation;
        let inner = Arc::clone(&self.inner);
        debug!(query = %query, generation, "Scheduling search");
        st.pending = Some(self.inner.runtime.spawn(run_search(inner, generation, query)));
    }

    pub fn clear(&self) {
        self.set_query("");
    }

    /// Flip the "has cover" filter, returning the new value
    ///
    /// Held results are re-filtered without a network call. A search still
    /// in flight picks up the new value when it completes.
    pub async fn toggle_cover_filter(&self) -> bool {
        let (enabled, generation) = {
            let mut st = self.inner.lock();
            st.cover_filter = !st.cover_filter;
            (st.cover_filter, st.generation)
        };

        debug!(enabled, "Cover filter toggled");
        self.inner.refilter(generation).await;
        enabled
    }

    /// Set the "has cover" filter; no-op when unchanged
    pub async fn set_cover_filter(&self, enabled: bool) -> bool {
        if self.cover_filter() == enabled {
            return enabled;
        }
        self.toggle_cover_filter().await
    }

    /// Recompute `is_wishlisted` on the held results and re-emit
    ///
    /// The state kind does not change. Nothing happens when no results are
    /// held.
    pub async fn refresh_wishlist_flags(&self) -> Result<()> {
        loop {
            let (generation, epoch) = {
                let st = self.inner.lock();
                if st.raw_results.is_none() {
                    return Ok(());
                }
                (st.generation, st.wishlist_epoch)
            };

            let keys = self.inner.wishlist_keys().await?;

            let mut st = self.inner.lock();
            if st.generation != generation {
                return Ok(());
            }
            if st.wishlist_epoch != epoch {
                debug!("Wishlist changed while refreshing flags, re-reading keys");
                continue;
            }
            let Some(raw) = st.raw_results.as_deref() else {
                return Ok(());
            };

            let records = derive_records(raw, &keys, st.cover_filter);
            let state = st.state;
            st.transition(state, records);
            return Ok(());
        }
    }

    /// Note a wishlist mutation and refresh the shown flags
    ///
    /// Call after every successful store mutation. The mutation has already
    /// been persisted, so a failed refresh is logged and not returned.
    pub async fn wishlist_changed(&self) {
        {
            let mut st = self.inner.lock();
            st.wishlist_epoch = st.wishlist_epoch.wrapping_add(1);
        }

        if let Err(e) = self.refresh_wishlist_flags().await {
            error!(error = %e, "Wishlist updated but shown results could not be refreshed");
        }
    }

    /// Commit a toggle and refresh the shown results if the store changed
    ///
    /// A failed commit is returned and nothing is recomputed. Once the
    /// commit succeeded its outcome is returned even if the refresh fails.
    pub async fn commit_toggle(&self, toggle: WishlistToggle) -> Result<ToggleOutcome> {
        let outcome = toggle.commit(self.inner.wishlist.as_ref()).await?;
        if outcome.is_mutation() {
            self.wishlist_changed().await;
        }
        Ok(outcome)
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        let mut st = self.inner.lock();
        st.cancel_pending();
        st.subscribers.clear();
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        // A panic while holding the lock leaves plain data behind; keep going
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    async fn wishlist_keys(&self) -> Result<HashSet<String>> {
        Ok(self.wishlist.keys().await?.into_iter().collect())
    }

    fn wishlist_epoch(&self) -> u64 {
        self.lock().wishlist_epoch
    }

    async fn refilter(&self, generation: u64) {
        loop {
            let epoch = {
                let st = self.lock();
                if !st.can_recompute(generation) {
                    return;
                }
                st.wishlist_epoch
            };

            let keys = self.wishlist_keys().await;

            let mut st = self.lock();
            if !st.can_recompute(generation) {
                return;
            }
            if st.wishlist_epoch != epoch {
                debug!("Wishlist changed while filtering, re-reading keys");
                continue;
            }

            st.apply_filtered(keys);
            return;
        }
    }

    /// Apply a finished search, unless a newer query superseded it
    ///
    /// With `epoch` set, a found result whose wishlist keys were read before
    /// the latest mutation is handed back for another key read.
    fn apply(&self, generation: u64, epoch: Option<u64>, outcome: SearchOutcome) -> Option<SearchOutcome> {
        let mut st = self.lock();
        if st.generation != generation {
            debug!(generation, current = st.generation, "Dropping stale search result");
            return None;
        }
        if epoch.is_some_and(|epoch| epoch != st.wishlist_epoch) {
            debug!(generation, "Wishlist changed during search, re-reading keys");
            return Some(outcome);
        }
        st.pending = None;

        match outcome {
            SearchOutcome::Found(raw, keys) => {
                let records = derive_records(&raw, &keys, st.cover_filter);
                let state = if records.is_empty() {
                    SearchState::ZeroResults
                } else {
                    SearchState::ResultsFound
                };
                info!(query = %st.query, found = raw.len(), shown = records.len(), "Search completed");
                st.raw_results = Some(raw);
                st.transition(state, records);
            }
            SearchOutcome::CatalogFailed(e) if e.is_no_connectivity() => {
                info!(query = %st.query, error = %e, "Search failed, no connectivity");
                st.transition(SearchState::NoInternet, Vec::new());
            }
            SearchOutcome::CatalogFailed(e) => {
                warn!(query = %st.query, error = %e, "Search response unusable, showing zero results");
                st.transition(SearchState::ZeroResults, Vec::new());
            }
            SearchOutcome::StoreFailed(e) => {
                error!(query = %st.query, error = %e, "Failed to read wishlist after search");
                st.transition(SearchState::ZeroResults, Vec::new());
            }
        }
        None
    }
}

async fn run_search(inner: Arc<Inner>, generation: u64, query: String) {
    tokio::time::sleep(inner.debounce).await;

    if !inner.is_current(generation) {
        return;
    }

    debug!(query = %query, generation, "Debounce elapsed, querying catalog");
    let mut raw = match inner.catalog.search(&query).await {
        Ok(raw) => raw,
        Err(e) => {
            inner.apply(generation, None, SearchOutcome::CatalogFailed(e));
            return;
        }
    };

    loop {
        let epoch = inner.wishlist_epoch();
        let outcome = match inner.wishlist_keys().await {
            Ok(keys) => SearchOutcome::Found(raw, keys),
            Err(e) => {
                inner.apply(generation, None, SearchOutcome::StoreFailed(e));
                return;
            }
        };

        match inner.apply(generation, Some(epoch), outcome) {
            Some(SearchOutcome::Found(stale, _)) => raw = stale,
            _ => return,
        }
    }
}

/// Build the visible records from a raw result set
///
/// Duplicate keys keep their first occurrence.
pub fn derive_records(
    raw: &[RawSearchResult],
    wishlisted: &HashSet<String>,
    cover_filter: bool,
) -> Vec<BookRecord> {
    let mut seen = HashSet::with_capacity(raw.len());
    raw.iter()
        .filter(|r| !cover_filter || r.has_cover())
        .filter(|r| seen.insert(r.key.as_str()))
        .map(|r| BookRecord::from_raw(r, wishlisted.contains(&r.key)))
        .collect()
}
