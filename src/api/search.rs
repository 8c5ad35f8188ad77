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


//! Open Library search API wire types
//!
//! # Endpoint
//! `GET https://openlibrary.org/search.json?q=<query>`
//!
//! # Response Format
//! ```json
//! {
//!   "start": 0,
//!   "num_found": 2,
//!   "docs": [
//!     {
//!       "key": "/works/OL893415W",
//!       "title": "Dune",
//!       "author_name": ["Frank Herbert"],
//!       "cover_i": 11481354,
//!       "edition_count": 120,
//!       "first_publish_year": 1965,
//!       "language": ["eng", "spa"]
//!     }
//!   ]
//! }
//! ```
//!
//! Only `key` is guaranteed by the API. Every other field is optional and
//! unknown fields are ignored.

use crate::error::{LibraryError, Result};
use serde::{Deserialize, Serialize};

/// Longest body snippet kept on a decode failure
const MAX_BODY_SNIPPET: usize = 400;

/// Top-level search response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub start: Option<u64>,

    #[serde(default)]
    pub num_found: Option<u64>,

    pub docs: Vec<RawSearchResult>,
}

/// One search hit, as returned by the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResult {
    /// Catalog key (stable primary identifier)
    pub key: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(rename = "author_name", default)]
    pub author_names: Option<Vec<String>>,

    #[serde(rename = "publisher", default)]
    pub publishers: Option<Vec<String>>,

    #[serde(default)]
    pub first_publish_year: Option<i32>,

    /// Numeric cover identifier
    #[serde(rename = "cover_i", default)]
    pub cover_id: Option<i64>,

    #[serde(rename = "id_goodreads", default)]
    pub goodreads_ids: Option<Vec<String>>,

    #[serde(rename = "has_fulltext", default)]
    pub has_full_text: Option<bool>,

    #[serde(rename = "subject", default)]
    pub subjects: Option<Vec<String>>,

    #[serde(rename = "language", default)]
    pub languages: Option<Vec<String>>,

    #[serde(default)]
    pub edition_count: Option<i64>,
}

impl RawSearchResult {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn has_cover(&self) -> bool {
        self.cover_id.is_some()
    }
}

/// Escape a free-text query for the `q` parameter
///
/// Each space-separated part is percent-encoded and the parts are joined
/// with `+`, so "the left hand" becomes "the+left+hand".
pub fn escape_query(query: &str) -> String {
    query
        .split(' ')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

/// Build the full search URL for a query
pub fn build_search_url(endpoint: &str, query: &str) -> Result<String> {
    let base = url::Url::parse(endpoint)
        .map_err(|e| LibraryError::InvalidSearchUrl(format!("{}: {}", endpoint, e)))?;

    let separator = if base.query().is_some() { '&' } else { '?' };
    Ok(format!("{}{}q={}", endpoint, separator, escape_query(query)))
}

/// Decode a search response body
///
/// A document without `key` fails the whole payload.
pub fn parse_search_response(body: &[u8]) -> Result<SearchResponse> {
    serde_json::from_slice::<SearchResponse>(body).map_err(|e| {
        let text = String::from_utf8_lossy(body);
        let snippet: String = text.chars().take(MAX_BODY_SNIPPET).collect();
        LibraryError::decode_failure(
            format!("Parse error: {} at line {} col {}", e, e.line(), e.column()),
            Some(snippet),
        )
    })
}
