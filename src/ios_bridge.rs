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


//! C FFI bridge for iOS - Exposes the search and wishlist core to Swift
//!
//! # Architecture
//! Swift (SearchViewController, WishlistViewController) → C FFI → Rust
//!
//! # Design Patterns
//! 1. **JSON Communication**: All complex data is serialized to JSON for FFI crossing
//! 2. **Error Handling**: All errors are caught and returned as JSON error responses
//! 3. **Async Runtime**: A process-wide Tokio runtime drives searches and store access
//! 4. **No Panics**: All panics are caught to prevent crashes across FFI boundary
//! 5. **Memory Safety**: All returned strings must be freed by caller using `rust_free_string()`
//!
//! # Response Format
//! All functions return JSON strings with this structure:
//! ```json
//! {
//!   "success": true,
//!   "data": { ... }
//! }
//! ```
//! Or on error:
//! ```json
//! {
//!   "success": false,
//!   "error": "Error message"
//! }
//! ```
//!
//! # Memory Management
//! **CRITICAL**: All string pointers returned from Rust functions MUST be freed
//! by the caller using `rust_free_string()`. Failure to do so will cause memory leaks.
//!
//! Example Swift code:
//! ```swift
//! let resultPtr = rust_set_query("dune")
//! defer { rust_free_string(resultPtr) }
//! let jsonString = String(cString: resultPtr)
//! ```

use crate::api::covers::CoverSize;
use crate::app::LibraryApp;
use crate::config::CoreConfig;
use crate::error::{LibraryError, Result};
use crate::storage::models::BookRecord;
use serde::Serialize;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Called with a `{"success": true, "data": <SearchUpdate>}` JSON string
///
/// The pointer is only valid for the duration of the call; copy it.
pub type SearchCallback = extern "C" fn(*const c_char);

// Lazy static tokio runtime for async operations
lazy_static::lazy_static! {
    static ref RUNTIME: tokio::runtime::Runtime =
        tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    static ref APP: Mutex<Option<Arc<LibraryApp>>> = Mutex::new(None);

    static ref SEARCH_LISTENER: Mutex<Option<JoinHandle<()>>> = Mutex::new(None);
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Safely convert C string pointer to Rust String
///
/// # Safety
/// Caller must ensure ptr is a valid null-terminated C string
fn c_str_to_string(ptr: *const c_char) -> Result<String> {
    if ptr.is_null() {
        return Err(LibraryError::InvalidInput("Null pointer received".to_string()));
    }
    unsafe {
        CStr::from_ptr(ptr)
            .to_str()
            .map(|s| s.to_string())
            .map_err(|e| LibraryError::InvalidInput(format!("Invalid UTF-8: {}", e)))
    }
}

/// Convert Rust string to C string pointer
///
/// # Safety
/// Caller MUST free the returned pointer using `rust_free_string()`
fn string_to_c_str(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_string) => c_string.into_raw(),
        Err(_) => {
            // Error JSON built from a literal never contains a NUL
            let error_json = error_response("String contains null bytes");
            CString::new(error_json).unwrap_or_default().into_raw()
        }
    }
}

/// Create success response JSON
fn success_response<T: Serialize>(data: T) -> String {
    serde_json::json!({
        "success": true,
        "data": data
    })
    .to_string()
}

/// Create error response JSON
fn error_response(error: &str) -> String {
    serde_json::json!({
        "success": false,
        "error": error
    })
    .to_string()
}

/// Wrap a function call with panic catching
fn catch_panic<F>(f: F) -> String
where
    F: FnOnce() -> Result<String> + panic::UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => error_response(&e.to_string()),
        Err(panic_err) => {
            let panic_msg = if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic occurred".to_string()
            };
            error_response(&format!("Rust panic: {}", panic_msg))
        }
    }
}

/// Current app, or an error if `rust_init` has not run
fn app() -> Result<Arc<LibraryApp>> {
    let guard = APP
        .lock()
        .map_err(|_| LibraryError::internal("App lock poisoned"))?;
    guard
        .clone()
        .ok_or_else(|| LibraryError::InvalidState("rust_init has not been called".to_string()))
}

fn parse_record(json: *const c_char) -> Result<BookRecord> {
    let json = c_str_to_string(json)?;
    Ok(serde_json::from_str(&json)?)
}

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Initialize the core
///
/// # Arguments
/// * `config_json` - `CoreConfig` as JSON; empty string or null for defaults.
///   Environment overrides are applied on top.
///
/// # Returns
/// ```json
/// {
///   "success": true,
///   "data": { "database_path": "...", "debounce_ms": 300 }
/// }
/// ```
///
/// Calling it again replaces the previous app and drops its search listener.
///
/// # Safety
/// Caller must free the returned string with `rust_free_string()`
#[no_mangle]
pub extern "C" fn rust_init(config_json: *const c_char) -> *mut c_char {
    let response = catch_panic(|| {
        let config = if config_json.is_null() {
            CoreConfig::default()
        } else {
            let json = c_str_to_string(config_json)?;
            if json.trim().is_empty() {
                CoreConfig::default()
            } else {
                CoreConfig::from_json_str(&json)?
            }
        }
        .with_env_overrides()?;

        crate::logging::init_logging(&config.log_filter);

        let app = RUNTIME.block_on(LibraryApp::open(config))?;
        let response = serde_json::json!({
            "database_path": app.database().and_then(|db| db.path()).map(|p| p.display().to_string()),
            "debounce_ms": app.config().debounce_ms,
        });

        stop_search_listener();
        *APP.lock().map_err(|_| LibraryError::internal("App lock poisoned"))? = Some(Arc::new(app));
        info!("Core initialized over FFI");

        Ok(success_response(response))
    });

    string_to_c_str(response)
}

/// Free a string returned by any `rust_*` function
///
/// # Safety
/// `s` must come from this library and must not be used afterwards
#[no_mangle]
pub extern "C" fn rust_free_string(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            drop(CString::from_raw(s));
        }
    }
}

// ============================================================================
// SEARCH
// ============================================================================

/// Handle new search text
///
/// Returns immediately with the resulting update (`performing_search` or
/// `no_search_entry`); the settled state arrives through the registered
/// search callback.
///
/// # Safety
/// Caller must free the returned string with `rust_free_string()`
#[no_mangle]
pub extern "C" fn rust_set_query(text: *const c_char) -> *mut c_char {
    let response = catch_panic(|| {
        let text = c_str_to_string(text)?;
        let app = app()?;
        debug!(query = %text, "rust_set_query");

        app.set_query(&text);
        Ok(success_response(app.current_search()))
    });

    string_to_c_str(response)
}

/// Flip the "has cover" filter
///
/// # Returns
/// ```json
/// { "success": true, "data": { "cover_filter": true } }
/// ```
#[no_mangle]
pub extern "C" fn rust_toggle_cover_filter() -> *mut c_char {
    let response = catch_panic(|| {
        let app = app()?;
        let enabled = RUNTIME.block_on(app.toggle_cover_filter());
        Ok(success_response(serde_json::json!({ "cover_filter": enabled })))
    });

    string_to_c_str(response)
}

/// Set the "has cover" filter
#[no_mangle]
pub extern "C" fn rust_set_cover_filter(enabled: bool) -> *mut c_char {
    let response = catch_panic(|| {
        let app = app()?;
        let enabled = RUNTIME.block_on(app.set_cover_filter(enabled));
        Ok(success_response(serde_json::json!({ "cover_filter": enabled })))
    });

    string_to_c_str(response)
}

/// Current search state, records, query and filter
///
/// # Returns
/// ```json
/// {
///   "success": true,
///   "data": {
///     "state": "results_found",
///     "records": [ { "key": "/works/OL893415W", "title": "Dune", ... } ],
///     "query": "dune",
///     "cover_filter": false
///   }
/// }
/// ```
#[no_mangle]
pub extern "C" fn rust_current_search() -> *mut c_char {
    let response = catch_panic(|| {
        let app = app()?;
        Ok(success_response(app.current_search()))
    });

    string_to_c_str(response)
}

/// Register the search callback, replacing any previous one
///
/// Every search update is delivered to `callback` on a runtime worker
/// thread; dispatch to the main queue on the Swift side. Pass null to
/// unregister.
#[no_mangle]
pub extern "C" fn rust_register_search_callback(callback: Option<SearchCallback>) -> *mut c_char {
    let response = catch_panic(|| {
        let app = app()?;
        stop_search_listener();

        let Some(callback) = callback else {
            return Ok(success_response(serde_json::json!({ "registered": false })));
        };

        let mut rx = app.subscribe();
        let handle = RUNTIME.spawn(async move {
            while let Some(update) = rx.recv().await {
                if let Ok(json) = CString::new(success_response(update)) {
                    callback(json.as_ptr());
                }
            }
        });

        *SEARCH_LISTENER
            .lock()
            .map_err(|_| LibraryError::internal("Listener lock poisoned"))? = Some(handle);

        Ok(success_response(serde_json::json!({ "registered": true })))
    });

    string_to_c_str(response)
}

fn stop_search_listener() {
    if let Ok(mut listener) = SEARCH_LISTENER.lock() {
        if let Some(handle) = listener.take() {
            handle.abort();
        }
    }
}

/// Recompute wishlist flags on the shown results
///
/// For screens that changed the wishlist behind the coordinator's back.
#[no_mangle]
pub extern "C" fn rust_refresh_search() -> *mut c_char {
    let response = catch_panic(|| {
        let app = app()?;
        RUNTIME.block_on(app.refresh_search())?;
        Ok(success_response(app.current_search()))
    });

    string_to_c_str(response)
}

// ============================================================================
// WISHLIST
// ============================================================================

/// All wishlisted records in insertion order
#[no_mangle]
pub extern "C" fn rust_wishlist_list() -> *mut c_char {
    let response = catch_panic(|| {
        let app = app()?;
        let records = RUNTIME.block_on(app.wishlist_list())?;
        Ok(success_response(records))
    });

    string_to_c_str(response)
}

/// # Returns
/// ```json
/// { "success": true, "data": { "contains": true } }
/// ```
#[no_mangle]
pub extern "C" fn rust_wishlist_contains(key: *const c_char) -> *mut c_char {
    let response = catch_panic(|| {
        let key = c_str_to_string(key)?;
        let app = app()?;
        let contains = RUNTIME.block_on(app.wishlist_contains(&key))?;
        Ok(success_response(serde_json::json!({ "contains": contains })))
    });

    string_to_c_str(response)
}

/// Add a `BookRecord` (JSON) to the wishlist
#[no_mangle]
pub extern "C" fn rust_wishlist_add(record_json: *const c_char) -> *mut c_char {
    let response = catch_panic(|| {
        let record = parse_record(record_json)?;
        let app = app()?;
        let added = RUNTIME.block_on(app.wishlist_add(&record))?;
        Ok(success_response(serde_json::json!({ "added": added })))
    });

    string_to_c_str(response)
}

#[no_mangle]
pub extern "C" fn rust_wishlist_remove(key: *const c_char) -> *mut c_char {
    let response = catch_panic(|| {
        let key = c_str_to_string(key)?;
        let app = app()?;
        let removed = RUNTIME.block_on(app.wishlist_remove(&key))?;
        Ok(success_response(serde_json::json!({ "removed": removed })))
    });

    string_to_c_str(response)
}

/// Remove by position in the wishlist order (swipe to delete)
///
/// # Returns
/// ```json
/// { "success": true, "data": { "record": { ... } } }
/// ```
/// `record` is null when the index is out of range.
#[no_mangle]
pub extern "C" fn rust_wishlist_remove_at(index: u64) -> *mut c_char {
    let response = catch_panic(|| {
        let app = app()?;
        let index = usize::try_from(index)
            .map_err(|_| LibraryError::invalid_input(format!("Index out of range: {}", index)))?;
        let record = RUNTIME.block_on(app.wishlist_remove_at(index))?;
        Ok(success_response(serde_json::json!({ "record": record })))
    });

    string_to_c_str(response)
}

/// Commit a detail screen session
///
/// # Arguments
/// * `record_json` - the `BookRecord` as it was shown
/// * `changed` - whether the wishlist button ended up flipped
///
/// # Returns
/// ```json
/// { "success": true, "data": { "outcome": "added" } }
/// ```
#[no_mangle]
pub extern "C" fn rust_commit_wishlist_change(record_json: *const c_char, changed: bool) -> *mut c_char {
    let response = catch_panic(|| {
        let record = parse_record(record_json)?;
        let app = app()?;
        let outcome = RUNTIME.block_on(app.commit_wishlist_change(record, changed))?;
        Ok(success_response(serde_json::json!({ "outcome": outcome })))
    });

    string_to_c_str(response)
}

// ============================================================================
// COVERS
// ============================================================================

/// Cover image URL
///
/// # Arguments
/// * `cover_id` - `BookRecord.cover_id`
/// * `size` - "S", "M" or "L"; null for "M"
#[no_mangle]
pub extern "C" fn rust_cover_url(cover_id: *const c_char, size: *const c_char) -> *mut c_char {
    let response = catch_panic(|| {
        let cover_id = c_str_to_string(cover_id)?;
        let size = if size.is_null() {
            CoverSize::default()
        } else {
            let size = c_str_to_string(size)?;
            CoverSize::from_str(&size)
                .ok_or_else(|| LibraryError::invalid_input(format!("Unknown cover size: {}", size)))?
        };
        let app = app()?;
        Ok(success_response(serde_json::json!({ "url": app.cover_url(&cover_id, size) })))
    });

    string_to_c_str(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take(ptr: *mut c_char) -> serde_json::Value {
        let json = c_str_to_string(ptr).expect("Invalid response string");
        rust_free_string(ptr);
        serde_json::from_str(&json).expect("Response is not JSON")
    }

    #[test]
    fn test_success_response() {
        let response = success_response(serde_json::json!({"test": "data"}));
        assert!(response.contains("\"success\":true"));
        assert!(response.contains("\"test\":\"data\""));
    }

    #[test]
    fn test_error_response() {
        let response = error_response("Test error");
        assert!(response.contains("\"success\":false"));
        assert!(response.contains("Test error"));
    }

    #[test]
    fn test_catch_panic_with_panic() {
        let result = catch_panic(|| -> Result<String> {
            panic!("test panic");
        });
        assert!(result.contains("\"success\":false"));
        assert!(result.contains("test panic"));
    }

    #[test]
    fn test_null_pointer_handling() {
        assert!(c_str_to_string(std::ptr::null()).is_err());

        let response = take(rust_wishlist_contains(std::ptr::null()));
        assert_eq!(response["success"], false);
    }

    #[test]
    fn test_string_with_nul_becomes_error_json() {
        let ptr = string_to_c_str("bad\0string".to_string());
        let response = take(ptr);
        assert_eq!(response["success"], false);
    }

    #[test]
    fn test_bridge_round_trip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = serde_json::json!({
            "database_path": dir.path().join("wishlist.db"),
            "debounce_ms": 10,
        })
        .to_string();
        let config = CString::new(config).unwrap();

        let response = take(rust_init(config.as_ptr()));
        assert_eq!(response["success"], true, "{}", response);
        assert_eq!(response["data"]["debounce_ms"], 10);

        let record = serde_json::to_string(&BookRecord::from_raw(
            &crate::api::search::RawSearchResult::new("/works/OL1W"),
            false,
        ))
        .unwrap();
        let record = CString::new(record).unwrap();

        let response = take(rust_commit_wishlist_change(record.as_ptr(), true));
        assert_eq!(response["data"]["outcome"], "added");

        let key = CString::new("/works/OL1W").unwrap();
        let response = take(rust_wishlist_contains(key.as_ptr()));
        assert_eq!(response["data"]["contains"], true);

        let response = take(rust_wishlist_list());
        assert_eq!(response["data"][0]["is_wishlisted"], true);

        let response = take(rust_wishlist_remove_at(5));
        assert!(response["data"]["record"].is_null());

        let response = take(rust_wishlist_remove_at(u64::MAX));
        assert!(response["data"]["record"].is_null());
        let response = take(rust_wishlist_contains(key.as_ptr()));
        assert_eq!(response["data"]["contains"], true);

        let response = take(rust_wishlist_remove_at(0));
        assert_eq!(response["data"]["record"]["key"], "/works/OL1W");

        let empty = CString::new("").unwrap();
        let response = take(rust_set_query(empty.as_ptr()));
        assert_eq!(response["data"]["state"], "no_search_entry");

        let id = CString::new("42").unwrap();
        let size = CString::new("L").unwrap();
        let response = take(rust_cover_url(id.as_ptr(), size.as_ptr()));
        assert_eq!(response["data"]["url"], "https://covers.openlibrary.org/b/id/42-L.jpg");

        let response = take(rust_toggle_cover_filter());
        assert_eq!(response["data"]["cover_filter"], true);
    }
}
