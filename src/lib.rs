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


//! Open Library search and wishlist core
//!
//! Native core of the book search app: debounced catalog search with a
//! "has cover" filter, five search screen states, and a persisted wishlist
//! whose membership is reflected on every search result.
//!
//! # Modules
//! - `api` - Open Library HTTP client and wire types
//! - `search` - search coordinator, states, wishlist toggle
//! - `storage` - SQLite wishlist, book models
//! - `app` - facade held by the FFI bridge and the CLI
//! - `ios_bridge` - C ABI for Swift

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod search;
pub mod storage;

// C FFI bridge for iOS
pub mod ios_bridge;

pub use app::LibraryApp;
pub use config::CoreConfig;
pub use error::{LibraryError, Result};
pub use logging::init_logging;
