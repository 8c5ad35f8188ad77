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


//! Core configuration
//!
//! Every field has a default, so an empty JSON object (`{}`) is a valid
//! configuration. The mobile apps pass their overrides as JSON through the
//! FFI bridge; the desktop CLI layers environment variables on top.
//!
//! # Environment overrides
//! - `OPENLIBRARY_SEARCH_URL` - search endpoint
//! - `OPENLIBRARY_COVER_URL` - cover image base URL
//! - `OPENLIBRARY_DEBOUNCE_MS` - quiet interval before a search fires
//! - `OPENLIBRARY_TIMEOUT_SECS` - HTTP request timeout
//! - `OPENLIBRARY_DB_PATH` - wishlist database file

use crate::error::{LibraryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Open Library search endpoint
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://openlibrary.org/search.json";

/// Open Library cover image base URL
pub const DEFAULT_COVER_ENDPOINT: &str = "https://covers.openlibrary.org/b/id";

/// Quiet interval after the last keystroke before a search fires
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default tracing filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "openlibrary_core=info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub search_endpoint: String,
    pub cover_endpoint: String,
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Wishlist database location; `None` uses the platform default
    pub database_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            cover_endpoint: DEFAULT_COVER_ENDPOINT.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("openlibrary-core/{}", env!("CARGO_PKG_VERSION")),
            database_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CoreConfig {
    /// Parse configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CoreConfig = serde_json::from_str(json)
            .map_err(|e| LibraryError::ConfigurationError(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LibraryError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&contents)
    }

    /// Apply `OPENLIBRARY_*` environment variables on top of this config
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("OPENLIBRARY_SEARCH_URL") {
            self.search_endpoint = url;
        }
        if let Ok(url) = std::env::var("OPENLIBRARY_COVER_URL") {
            self.cover_endpoint = url;
        }
        if let Ok(ms) = std::env::var("OPENLIBRARY_DEBOUNCE_MS") {
            self.debounce_ms = ms.parse().map_err(|e| {
                LibraryError::InvalidConfiguration(format!("OPENLIBRARY_DEBOUNCE_MS: {}", e))
            })?;
        }
        if let Ok(secs) = std::env::var("OPENLIBRARY_TIMEOUT_SECS") {
            self.request_timeout_secs = secs.parse().map_err(|e| {
                LibraryError::InvalidConfiguration(format!("OPENLIBRARY_TIMEOUT_SECS: {}", e))
            })?;
        }
        if let Ok(path) = std::env::var("OPENLIBRARY_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject endpoints that are not absolute URLs and a zero timeout
    pub fn validate(&self) -> Result<()> {
        for (name, endpoint) in [
            ("search_endpoint", &self.search_endpoint),
            ("cover_endpoint", &self.cover_endpoint),
        ] {
            url::Url::parse(endpoint).map_err(|e| {
                LibraryError::InvalidConfiguration(format!("{} '{}': {}", name, endpoint, e))
            })?;
        }

        if self.request_timeout_secs == 0 {
            return Err(LibraryError::InvalidConfiguration(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("Failed to parse config");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.search_endpoint, DEFAULT_SEARCH_ENDPOINT);
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = CoreConfig::from_json_str(
            r#"{"debounce_ms": 50, "database_path": "/tmp/wishlist.db"}"#,
        )
        .expect("Failed to parse config");

        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/wishlist.db")));
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = CoreConfig::from_json_str(r#"{"search_endpoint": "not a url"}"#);
        assert!(matches!(result, Err(LibraryError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = CoreConfig {
            request_timeout_secs: 0,
            ..CoreConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("core.json");
        std::fs::write(&path, r#"{"user_agent": "TestAgent/1.0"}"#).expect("Failed to write config");

        let config = CoreConfig::from_json_file(&path).expect("Failed to load config");
        assert_eq!(config.user_agent, "TestAgent/1.0");

        let missing = CoreConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(LibraryError::ConfigurationError(_))));
    }
}
