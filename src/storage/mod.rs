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


//! Wishlist persistence and book models
//!
//! This module handles all database operations using SQLite via sqlx.
//!
//! # Database Schema
//! - Wishlist: saved books, one row per catalog key, ordered by insertion
//!
//! # Usage Example
//! ```no_run
//! use openlibrary_core::storage::{Database, SqliteWishlist, WishlistStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./wishlist.db").await?;
//! let wishlist = SqliteWishlist::new(db);
//!
//! for book in wishlist.list().await? {
//!     println!("{} {}", book.title, book.author_label);
//! }
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod wishlist;

// Re-export commonly used types
pub use database::Database;
pub use models::{BookRecord, DetailField, WishlistRow};
pub use wishlist::{MemoryWishlist, SqliteWishlist, WishlistStore};
