//! Error types for the Open Library core
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are categorized by domain (network, storage, configuration) so the
//! search flow can decide how each failure surfaces to the user.
//!
//! ## How failures surface
//!
//! ### Network (CatalogClient)
//! - No response, refused connection, timeout → `NoConnectivity`
//!   (the search screen shows its "no internet" state)
//! - Body that is not a valid search payload → `DecodeFailure`
//!   (logged, treated as zero results)
//! - Non-2xx status → `UnexpectedStatusCode` (decode class: a response arrived)
//!
//! ### Storage (WishlistStore)
//! - Any sqlx failure → `SqlxError` / `StoreError`
//! - The mutation is reported as failed and no records are recomputed

use thiserror::Error;

/// Result type alias using our LibraryError type
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Coarse classification of a network failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// No response at all (transport failure)
    NoConnectivity,
    /// A response arrived but could not be used
    DecodeFailure,
}

/// Main error type for the Open Library core
#[derive(Error, Debug)]
pub enum LibraryError {
    // ===== Network Errors =====

    /// Transport failure: no connection, DNS failure, timeout, dropped body
    #[error("No connectivity: {message}")]
    NoConnectivity {
        message: String,
        /// Endpoint that was being contacted
        endpoint: Option<String>,
    },

    /// Response body could not be decoded into the expected shape
    #[error("Malformed response: {message}")]
    DecodeFailure {
        message: String,
        /// Response body snippet for debugging
        response_body: Option<String>,
    },

    /// Server answered with a non-success status
    #[error("Server responded with unexpected status code: {status_code}")]
    UnexpectedStatusCode {
        status_code: u16,
        endpoint: String,
    },

    /// Search URL could not be built from the configured endpoint
    #[error("Invalid search URL: {0}")]
    InvalidSearchUrl(String),

    // ===== Storage Errors =====

    /// Persistence-layer failure (write conflict, corrupt row, ...)
    #[error("Store error: {0}")]
    StoreError(String),

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database record not found
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Row could not be turned back into an entity
    #[error("Could not load a valid {entity_type} from database")]
    InvalidDatabaseEntity {
        entity_type: String,
    },

    // ===== Input/Configuration Errors =====

    /// Generic input validation error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration is invalid or incomplete
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Application state is invalid for the requested operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Generic file I/O error
    #[error("File I/O error: {0}")]
    FileIoError(String),

    // ===== General Errors =====

    /// Operation was cancelled by user or system
    #[error("Operation cancelled")]
    Cancelled,

    /// Internal error that should not normally occur
    #[error("Internal error: {0}")]
    InternalError(String),

    // ===== External Library Errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<std::string::FromUtf8Error> for LibraryError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        LibraryError::InternalError(format!("UTF-8 conversion error: {}", err))
    }
}

// Helper methods for creating common errors
impl LibraryError {
    /// Create a RecordNotFound error with a resource name
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        LibraryError::RecordNotFound(resource.into())
    }

    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        LibraryError::InvalidInput(message.into())
    }

    /// Create an InternalError with a message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        LibraryError::InternalError(message.into())
    }

    /// Create a NoConnectivity error
    pub fn no_connectivity<S: Into<String>>(message: S, endpoint: Option<String>) -> Self {
        LibraryError::NoConnectivity {
            message: message.into(),
            endpoint,
        }
    }

    /// Create a DecodeFailure error
    pub fn decode_failure<S: Into<String>>(message: S, response_body: Option<String>) -> Self {
        LibraryError::DecodeFailure {
            message: message.into(),
            response_body,
        }
    }

    /// Classify a network failure, `None` for non-network errors
    ///
    /// Raw reqwest errors are split the same way the client does it:
    /// connect/timeout/body failures mean no connectivity, decode failures
    /// mean a usable response never arrived.
    pub fn network_error_kind(&self) -> Option<NetworkErrorKind> {
        match self {
            LibraryError::NoConnectivity { .. } => Some(NetworkErrorKind::NoConnectivity),
            LibraryError::DecodeFailure { .. }
            | LibraryError::UnexpectedStatusCode { .. }
            | LibraryError::SerdeJsonError(_) => Some(NetworkErrorKind::DecodeFailure),
            LibraryError::ReqwestError(e) => {
                if e.is_decode() || e.is_status() {
                    Some(NetworkErrorKind::DecodeFailure)
                } else {
                    Some(NetworkErrorKind::NoConnectivity)
                }
            }
            _ => None,
        }
    }

    /// Check if error means the device could not reach the catalog
    pub fn is_no_connectivity(&self) -> bool {
        self.network_error_kind() == Some(NetworkErrorKind::NoConnectivity)
    }

    /// Check if error came from the persistence layer
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            LibraryError::StoreError(_)
                | LibraryError::MigrationFailed(_)
                | LibraryError::RecordNotFound(_)
                | LibraryError::InvalidDatabaseEntity { .. }
                | LibraryError::SqlxError(_)
        )
    }

    /// Check if re-issuing the same operation might succeed
    ///
    /// The core never retries on its own; this is for callers that want to
    /// offer a "try again" affordance.
    pub fn is_retryable(&self) -> bool {
        match self {
            LibraryError::UnexpectedStatusCode { status_code, .. } => {
                (500..=599).contains(status_code)
            }
            _ => self.is_no_connectivity(),
        }
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            e if e.is_no_connectivity() => {
                "No internet connection. Check your connection and search again.".to_string()
            }
            LibraryError::DecodeFailure { .. } | LibraryError::UnexpectedStatusCode { .. } => {
                "Open Library returned an unexpected response. Please try again later.".to_string()
            }
            e if e.is_store_error() => {
                "Your wishlist could not be updated. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_kinds() {
        let offline = LibraryError::no_connectivity("connection refused", None);
        assert_eq!(offline.network_error_kind(), Some(NetworkErrorKind::NoConnectivity));
        assert!(offline.is_retryable());

        let garbled = LibraryError::decode_failure("expected value", Some("<html>".to_string()));
        assert_eq!(garbled.network_error_kind(), Some(NetworkErrorKind::DecodeFailure));
        assert!(!garbled.is_retryable());

        let status = LibraryError::UnexpectedStatusCode {
            status_code: 503,
            endpoint: "/search.json".to_string(),
        };
        assert_eq!(status.network_error_kind(), Some(NetworkErrorKind::DecodeFailure));
        assert!(status.is_retryable());

        assert_eq!(LibraryError::StoreError("locked".to_string()).network_error_kind(), None);
    }

    #[test]
    fn test_store_error_classification() {
        assert!(LibraryError::StoreError("write conflict".to_string()).is_store_error());
        assert!(LibraryError::not_found("k1").is_store_error());
        assert!(!LibraryError::invalid_input("bad").is_store_error());
    }

    #[test]
    fn test_user_message() {
        let offline = LibraryError::no_connectivity("dns", Some("/search.json".to_string()));
        assert!(offline.user_message().contains("No internet"));

        let store = LibraryError::StoreError("disk full".to_string());
        assert!(store.user_message().contains("wishlist"));

        let other = LibraryError::invalid_input("empty key");
        assert_eq!(other.user_message(), "Invalid input: empty key");
    }
}
