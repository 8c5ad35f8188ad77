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


//! Open Library API client implementation
//!
//! This module talks to the public Open Library endpoints:
//! - `search.json` - full-text catalog search
//! - `covers.openlibrary.org/b/id/<id>-<size>.jpg` - cover images

pub mod client;
pub mod covers;
pub mod search;

// Re-export commonly used types
pub use client::{CatalogClient, CatalogSearch, ClientConfig, ClientConfigBuilder};
pub use covers::{cover_url, CoverSize};
pub use search::{RawSearchResult, SearchResponse};
