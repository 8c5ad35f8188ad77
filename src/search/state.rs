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


//! Search screen states

use crate::storage::models::BookRecord;
use serde::{Deserialize, Serialize};

/// What the search screen should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    /// Nothing typed, or the cover filter hid every result
    #[default]
    NoSearchEntry,
    PerformingSearch,
    ZeroResults,
    NoInternet,
    ResultsFound,
}

impl SearchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchState::NoSearchEntry => "no_search_entry",
            SearchState::PerformingSearch => "performing_search",
            SearchState::ZeroResults => "zero_results",
            SearchState::NoInternet => "no_internet",
            SearchState::ResultsFound => "results_found",
        }
    }

    /// Only `ResultsFound` carries records
    pub fn shows_records(&self) -> bool {
        matches!(self, SearchState::ResultsFound)
    }
}

impl std::fmt::Display for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emission of the search coordinator
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchUpdate {
    pub state: SearchState,
    pub records: Vec<BookRecord>,
    /// Query the state belongs to, trimmed
    pub query: String,
    pub cover_filter: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serializes_like_as_str() {
        for state in [
            SearchState::NoSearchEntry,
            SearchState::PerformingSearch,
            SearchState::ZeroResults,
            SearchState::NoInternet,
            SearchState::ResultsFound,
        ] {
            let json = serde_json::to_string(&state).expect("Failed to serialize");
            assert_eq!(json, format!("\"{}\"", state.as_str()));
        }
    }

    #[test]
    fn test_default_update() {
        let update = SearchUpdate::default();
        assert_eq!(update.state, SearchState::NoSearchEntry);
        assert!(update.records.is_empty());
        assert!(!update.state.shows_records());
    }
}
