//! Cover image URLs
//!
//! `GET <cover-endpoint>/<coverId>-<size>.jpg`. The list and detail views
//! use the medium size. Caching and the "no cover" placeholder belong to the
//! presentation layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoverSize {
    #[serde(rename = "S")]
    Small,
    #[default]
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "L")]
    Large,
}

impl CoverSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverSize::Small => "S",
            CoverSize::Medium => "M",
            CoverSize::Large => "L",
        }
    }

    /// Accepts "S"/"M"/"L" in either case, or the full names
    pub fn from_str(size: &str) -> Option<Self> {
        match size.to_ascii_lowercase().as_str() {
            "s" | "small" => Some(CoverSize::Small),
            "m" | "medium" => Some(CoverSize::Medium),
            "l" | "large" => Some(CoverSize::Large),
            _ => None,
        }
    }
}

pub fn cover_url(base: &str, cover_id: &str, size: CoverSize) -> String {
    format!("{}/{}-{}.jpg", base.trim_end_matches('/'), cover_id, size.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_url() {
        assert_eq!(
            cover_url("https://covers.openlibrary.org/b/id", "11481354", CoverSize::Medium),
            "https://covers.openlibrary.org/b/id/11481354-M.jpg"
        );
        assert_eq!(
            cover_url("https://covers.openlibrary.org/b/id/", "42", CoverSize::Large),
            "https://covers.openlibrary.org/b/id/42-L.jpg"
        );
    }

    #[test]
    fn test_cover_size_parsing() {
        assert_eq!(CoverSize::from_str("s"), Some(CoverSize::Small));
        assert_eq!(CoverSize::from_str("Medium"), Some(CoverSize::Medium));
        assert_eq!(CoverSize::from_str("XL"), None);
    }
}
