//! Book models
//!
//! `BookRecord` is the normalized entry shown in search results and stored in
//! the wishlist. It is always derived from a `RawSearchResult`; the derived
//! labels are computed once at construction.
//!
//! # SQLite Adaptations
//! - Subject list stored as a JSON string (SQLite has no native array type)
//! - Booleans stored as integers
//! - `added_at` stored as TEXT in RFC 3339 format

use crate::api::search::RawSearchResult;
use crate::error::{LibraryError, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const UNKNOWN_TITLE: &str = "Unknown title";
pub const UNKNOWN_AUTHOR: &str = "Unknown author";
pub const DEFAULT_LANGUAGE: &str = "ENG";

// ============================================================================
// BOOK RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Catalog key, unique and never reassigned
    pub key: String,
    pub title: String,
    pub author_label: String,
    pub additional_info_label: String,
    pub cover_id: Option<String>,
    pub publisher: Option<String>,
    pub is_wishlisted: bool,
    pub has_full_text: bool,
    pub goodreads_available: bool,
    pub language: String,
    pub subjects: Vec<String>,
}

impl BookRecord {
    /// Derive a record from a raw search result
    ///
    /// `is_wishlisted` is the wishlist membership of `raw.key` right now; the
    /// caller looks it up so the flag is never carried over from an older
    /// record.
    pub fn from_raw(raw: &RawSearchResult, is_wishlisted: bool) -> Self {
        Self {
            key: raw.key.clone(),
            title: raw.title.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            author_label: format_author_label(raw.author_names.as_deref().unwrap_or(&[])),
            additional_info_label: format_additional_info(raw.edition_count, raw.first_publish_year),
            cover_id: raw.cover_id.map(|id| id.to_string()),
            publisher: raw.publishers.as_ref().and_then(|p| p.first().cloned()),
            is_wishlisted,
            has_full_text: raw.has_full_text.unwrap_or(false),
            goodreads_available: raw.goodreads_ids.as_ref().is_some_and(|ids| !ids.is_empty()),
            language: normalize_language(raw.languages.as_deref()),
            subjects: raw.subjects.clone().unwrap_or_default(),
        }
    }

    pub fn has_cover(&self) -> bool {
        self.cover_id.is_some()
    }

    /// Extra details for the detail screen, in display order
    pub fn detail_fields(&self) -> Vec<DetailField> {
        let mut fields = Vec::with_capacity(4);

        if let Some(publisher) = &self.publisher {
            fields.push(DetailField::Text {
                title: "PUBLISHER".to_string(),
                value: publisher.clone(),
            });
        }

        fields.push(DetailField::Emphasized {
            title: "LANGUAGE".to_string(),
            value: self.language.clone(),
        });
        fields.push(DetailField::Indicator {
            title: "FULL TEXT".to_string(),
            checked: self.has_full_text,
        });
        fields.push(DetailField::Indicator {
            title: "GOODREADS".to_string(),
            checked: self.goodreads_available,
        });

        fields
    }
}

/// "By X", "By X and Y", "By X, Y, and Z"
///
/// An empty list formats as "By Unknown author".
pub fn format_author_label(authors: &[String]) -> String {
    match authors {
        [] => format!("By {}", UNKNOWN_AUTHOR),
        [only] => format!("By {}", only),
        [first, second] => format!("By {} and {}", first, second),
        [init @ .., last] => format!("By {}, and {}", init.join(", "), last),
    }
}

/// "{n} editions" or "1 edition", plus " - first published {year}"
pub fn format_additional_info(edition_count: Option<i64>, first_publish_year: Option<i32>) -> String {
    let mut info = match edition_count.unwrap_or(1) {
        1 => "1 edition".to_string(),
        n => format!("{} editions", n),
    };

    if let Some(year) = first_publish_year {
        info.push_str(&format!(" - first published {}", year));
    }

    info
}

/// "ENG" unless the list is non-empty and lacks English, then the first code uppercased
pub fn normalize_language(languages: Option<&[String]>) -> String {
    match languages {
        Some(codes) if !codes.is_empty() => {
            if codes.iter().any(|code| code.eq_ignore_ascii_case("eng")) {
                DEFAULT_LANGUAGE.to_string()
            } else {
                codes[0].to_uppercase()
            }
        }
        _ => DEFAULT_LANGUAGE.to_string(),
    }
}

// ============================================================================
// DETAIL FIELDS
// ============================================================================

/// Presentation-agnostic detail entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailField {
    Text { title: String, value: String },
    Emphasized { title: String, value: String },
    Indicator { title: String, checked: bool },
}

// ============================================================================
// WISHLIST ROW
// ============================================================================

/// Row of the Wishlist table
#[derive(Debug, Clone, FromRow)]
pub struct WishlistRow {
    pub wishlist_id: i64,
    pub book_key: String,
    pub title: String,
    pub author_label: String,
    pub additional_info_label: String,
    pub cover_id: Option<String>,
    pub publisher: Option<String>,
    pub has_full_text: bool,
    pub goodreads_available: bool,
    pub language: String,
    /// JSON array
    pub subjects: String,
    pub added_at: String,
}

impl WishlistRow {
    /// Rebuild the record; anything in the wishlist is wishlisted
    pub fn into_record(self) -> Result<BookRecord> {
        let subjects: Vec<String> = serde_json::from_str(&self.subjects).map_err(|_| {
            LibraryError::InvalidDatabaseEntity {
                entity_type: format!("BookRecord ({})", self.book_key),
            }
        })?;

        Ok(BookRecord {
            key: self.book_key,
            title: self.title,
            author_label: self.author_label,
            additional_info_label: self.additional_info_label,
            cover_id: self.cover_id,
            publisher: self.publisher,
            is_wishlisted: true,
            has_full_text: self.has_full_text,
            goodreads_available: self.goodreads_available,
            language: self.language,
            subjects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_author_label() {
        assert_eq!(format_author_label(&names(&["A"])), "By A");
        assert_eq!(format_author_label(&names(&["A", "B"])), "By A and B");
        assert_eq!(format_author_label(&names(&["A", "B", "C"])), "By A, B, and C");
        assert_eq!(format_author_label(&names(&["A", "B", "C", "D"])), "By A, B, C, and D");
        assert_eq!(format_author_label(&[]), "By Unknown author");
    }

    #[test]
    fn test_additional_info() {
        assert_eq!(format_additional_info(None, None), "1 edition");
        assert_eq!(format_additional_info(Some(1), None), "1 edition");
        assert_eq!(format_additional_info(Some(120), None), "120 editions");
        assert_eq!(format_additional_info(Some(0), None), "0 editions");
        assert_eq!(
            format_additional_info(Some(3), Some(1965)),
            "3 editions - first published 1965"
        );
        assert_eq!(format_additional_info(None, Some(2001)), "1 edition - first published 2001");
    }

    #[test]
    fn test_language_normalization() {
        assert_eq!(normalize_language(None), "ENG");
        assert_eq!(normalize_language(Some(Vec::<String>::new().as_slice())), "ENG");
        assert_eq!(normalize_language(Some(names(&["fre", "eng"]).as_slice())), "ENG");
        assert_eq!(normalize_language(Some(names(&["ENG"]).as_slice())), "ENG");
        assert_eq!(normalize_language(Some(names(&["ger", "fre"]).as_slice())), "GER");
    }

    #[test]
    fn test_from_raw_defaults() {
        let record = BookRecord::from_raw(&RawSearchResult::new("/works/OL1W"), false);

        assert_eq!(record.key, "/works/OL1W");
        assert_eq!(record.title, "Unknown title");
        assert_eq!(record.author_label, "By Unknown author");
        assert_eq!(record.additional_info_label, "1 edition");
        assert_eq!(record.cover_id, None);
        assert_eq!(record.publisher, None);
        assert!(!record.is_wishlisted);
        assert!(!record.has_full_text);
        assert!(!record.goodreads_available);
        assert_eq!(record.language, "ENG");
        assert!(record.subjects.is_empty());
    }

    #[test]
    fn test_from_raw_full() {
        let raw = RawSearchResult {
            key: "/works/OL893415W".to_string(),
            title: Some("Dune".to_string()),
            author_names: Some(names(&["Frank Herbert"])),
            publishers: Some(names(&["Chilton Books", "Ace"])),
            first_publish_year: Some(1965),
            cover_id: Some(11481354),
            goodreads_ids: Some(names(&["234225"])),
            has_full_text: Some(true),
            subjects: Some(names(&["Science fiction", "Deserts"])),
            languages: Some(names(&["spa"])),
            edition_count: Some(120),
        };

        let record = BookRecord::from_raw(&raw, true);
        assert_eq!(record.title, "Dune");
        assert_eq!(record.author_label, "By Frank Herbert");
        assert_eq!(record.additional_info_label, "120 editions - first published 1965");
        assert_eq!(record.cover_id.as_deref(), Some("11481354"));
        assert_eq!(record.publisher.as_deref(), Some("Chilton Books"));
        assert!(record.is_wishlisted);
        assert!(record.has_full_text);
        assert!(record.goodreads_available);
        assert_eq!(record.language, "SPA");
        assert_eq!(record.subjects, names(&["Science fiction", "Deserts"]));
    }

    #[test]
    fn test_empty_goodreads_and_publishers() {
        let raw = RawSearchResult {
            goodreads_ids: Some(vec![]),
            publishers: Some(vec![]),
            ..RawSearchResult::new("k")
        };
        let record = BookRecord::from_raw(&raw, false);
        assert!(!record.goodreads_available);
        assert_eq!(record.publisher, None);
    }

    #[test]
    fn test_detail_fields() {
        let mut record = BookRecord::from_raw(&RawSearchResult::new("k"), false);
        let fields = record.detail_fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(
            fields[0],
            DetailField::Emphasized {
                title: "LANGUAGE".to_string(),
                value: "ENG".to_string()
            }
        );

        record.publisher = Some("Ace".to_string());
        record.goodreads_available = true;
        let fields = record.detail_fields();
        assert_eq!(fields.len(), 4);
        assert!(matches!(&fields[0], DetailField::Text { value, .. } if value == "Ace"));
        assert_eq!(
            fields[3],
            DetailField::Indicator {
                title: "GOODREADS".to_string(),
                checked: true
            }
        );
    }

    #[test]
    fn test_detail_field_json_shape() {
        let json = serde_json::to_value(DetailField::Indicator {
            title: "FULL TEXT".to_string(),
            checked: false,
        })
        .expect("Failed to serialize");
        assert_eq!(json["kind"], "indicator");
        assert_eq!(json["checked"], false);
    }
}
