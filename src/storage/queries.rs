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


//! Database query functions
//!
//! # Query Patterns
//! - One free function per statement, generic over the executor so the same
//!   query runs against the pool or inside a transaction
//! - Rows are converted to `BookRecord` by the caller via `WishlistRow::into_record`

use crate::error::Result;
use crate::storage::models::{BookRecord, WishlistRow};
use chrono::Utc;
use sqlx::{Executor, Sqlite};

const SELECT_WISHLIST_COLUMNS: &str = r#"
    SELECT wishlist_id, book_key, title, author_label, additional_info_label,
           cover_id, publisher, has_full_text, goodreads_available, language,
           subjects, added_at
    FROM Wishlist
"#;

// ============================================================================
// WISHLIST QUERIES
// ============================================================================

/// Insert a book into the wishlist
///
/// Returns `false` if a row with the same key already exists; the stored row
/// is left untouched in that case.
pub async fn insert_wishlist_book<'e, E>(executor: E, record: &BookRecord) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let subjects = serde_json::to_string(&record.subjects)?;

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO Wishlist (
            book_key, title, author_label, additional_info_label,
            cover_id, publisher, has_full_text, goodreads_available,
            language, subjects, added_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.key)
    .bind(&record.title)
    .bind(&record.author_label)
    .bind(&record.additional_info_label)
    .bind(&record.cover_id)
    .bind(&record.publisher)
    .bind(record.has_full_text)
    .bind(record.goodreads_available)
    .bind(&record.language)
    .bind(subjects)
    .bind(Utc::now().to_rfc3339())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Find wishlist row by catalog key
pub async fn find_wishlist_book<'e, E>(executor: E, book_key: &str) -> Result<Option<WishlistRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("{} WHERE book_key = ?", SELECT_WISHLIST_COLUMNS);
    let row = sqlx::query_as::<_, WishlistRow>(&sql)
        .bind(book_key)
        .fetch_optional(executor)
        .await?;

    Ok(row)
}

/// Find the wishlist row at `index` in insertion order
pub async fn find_wishlist_book_at<'e, E>(executor: E, index: i64) -> Result<Option<WishlistRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("{} ORDER BY wishlist_id ASC LIMIT 1 OFFSET ?", SELECT_WISHLIST_COLUMNS);
    let row = sqlx::query_as::<_, WishlistRow>(&sql)
        .bind(index)
        .fetch_optional(executor)
        .await?;

    Ok(row)
}

/// Delete wishlist row by catalog key
///
/// Returns `false` if no row matched.
pub async fn delete_wishlist_book<'e, E>(executor: E, book_key: &str) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM Wishlist WHERE book_key = ?")
        .bind(book_key)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// List wishlist rows in insertion order
pub async fn list_wishlist_books<'e, E>(executor: E) -> Result<Vec<WishlistRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("{} ORDER BY wishlist_id ASC", SELECT_WISHLIST_COLUMNS);
    let rows = sqlx::query_as::<_, WishlistRow>(&sql)
        .fetch_all(executor)
        .await?;

    Ok(rows)
}

/// List wishlisted catalog keys in insertion order
pub async fn list_wishlist_keys<'e, E>(executor: E) -> Result<Vec<String>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let keys = sqlx::query_scalar("SELECT book_key FROM Wishlist ORDER BY wishlist_id ASC")
        .fetch_all(executor)
        .await?;

    Ok(keys)
}

/// Count wishlist rows
pub async fn count_wishlist_books<'e, E>(executor: E) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Wishlist")
        .fetch_one(executor)
        .await?;

    Ok(count)
}

/// Delete every wishlist row, returning how many were removed
pub async fn clear_wishlist<'e, E>(executor: E) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM Wishlist").execute(executor).await?;
    Ok(result.rows_affected())
}

/// Convert a list of rows, failing on the first corrupt one
pub fn rows_into_records(rows: Vec<WishlistRow>) -> Result<Vec<BookRecord>> {
    rows.into_iter().map(WishlistRow::into_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::search::RawSearchResult;
    use crate::storage::Database;

    fn record(key: &str, title: &str) -> BookRecord {
        let raw = RawSearchResult {
            title: Some(title.to_string()),
            subjects: Some(vec!["Fiction".to_string()]),
            ..RawSearchResult::new(key)
        };
        BookRecord::from_raw(&raw, true)
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let inserted = insert_wishlist_book(db.pool(), &record("/works/OL1W", "Dune"))
            .await
            .expect("Failed to insert");
        assert!(inserted);

        let row = find_wishlist_book(db.pool(), "/works/OL1W")
            .await
            .expect("Failed to query")
            .expect("Row missing");
        assert_eq!(row.title, "Dune");

        let restored = row.into_record().expect("Failed to convert");
        assert_eq!(restored, record("/works/OL1W", "Dune"));
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_ignored() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        assert!(insert_wishlist_book(db.pool(), &record("k", "First")).await.unwrap());
        assert!(!insert_wishlist_book(db.pool(), &record("k", "Second")).await.unwrap());

        let rows = list_wishlist_books(db.pool()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "First");
    }

    #[tokio::test]
    async fn test_order_offset_and_delete() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        for key in ["a", "b", "c"] {
            insert_wishlist_book(db.pool(), &record(key, key)).await.unwrap();
        }

        assert_eq!(list_wishlist_keys(db.pool()).await.unwrap(), vec!["a", "b", "c"]);

        let second = find_wishlist_book_at(db.pool(), 1).await.unwrap().unwrap();
        assert_eq!(second.book_key, "b");
        assert!(find_wishlist_book_at(db.pool(), 3).await.unwrap().is_none());

        assert!(delete_wishlist_book(db.pool(), "b").await.unwrap());
        assert!(!delete_wishlist_book(db.pool(), "b").await.unwrap());
        assert_eq!(count_wishlist_books(db.pool()).await.unwrap(), 2);

        assert_eq!(clear_wishlist(db.pool()).await.unwrap(), 2);
        assert_eq!(count_wishlist_books(db.pool()).await.unwrap(), 0);
    }
}
