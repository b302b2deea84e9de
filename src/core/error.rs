//! Typed error handling for list fetching
//!
//! Every fetch returns a [`FetchError`] on failure so callers can tell an
//! unauthenticated call apart from a store failure or a malformed request.
//!
//! # Error Categories
//!
//! - [`FetchError::Unauthenticated`]: scoping was requested but no caller identity resolved
//! - [`StorageError`]: the record store rejected or failed the composed query
//! - [`RequestError`]: the per-call request is malformed
//! - [`ConfigError`]: a list configuration failed validation at build time
//!
//! # Example
//!
//! ```rust,ignore
//! match fetcher.fetch(&request).await {
//!     Ok(page) => println!("{} of {}", page.data.len(), page.total),
//!     Err(FetchError::Unauthenticated { .. }) => redirect_to_login(),
//!     Err(e) => eprintln!("list failed: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for list fetching
#[derive(Debug, Error)]
pub enum FetchError {
    /// Ownership scoping is configured but the caller could not be identified
    #[error("Unauthenticated: {reason}")]
    Unauthenticated { reason: String },

    /// The record store failed the query; carried verbatim
    #[error(transparent)]
    DataAccess(#[from] StorageError),

    /// The request is malformed
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl FetchError {
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        FetchError::Unauthenticated {
            reason: reason.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            FetchError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            FetchError::DataAccess(_) => StatusCode::BAD_GATEWAY,
            FetchError::InvalidRequest(e) => e.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::Unauthenticated { .. } => "UNAUTHENTICATED",
            FetchError::DataAccess(e) => e.error_code(),
            FetchError::InvalidRequest(e) => e.error_code(),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors reported by record stores
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The store could not be reached
    #[error("Failed to connect to {backend}: {message}")]
    ConnectionError { backend: String, message: String },

    /// The store rejected the query (syntax, permission, range)
    #[error("{backend} query error: {message}")]
    QueryError { backend: String, message: String },

    /// The store answered with something that could not be decoded
    #[error("{backend} returned an unreadable response: {message}")]
    DecodeError { backend: String, message: String },
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::ConnectionError { .. } => "STORAGE_UNREACHABLE",
            StorageError::QueryError { .. } => "STORAGE_QUERY_ERROR",
            StorageError::DecodeError { .. } => "STORAGE_DECODE_ERROR",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors in the per-call list request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Page numbers start at 1
    #[error("Invalid page {page}: pages start at 1")]
    InvalidPage { page: u64 },

    /// At least one item per page is required
    #[error("Invalid page size {items_per_page}: must be at least 1")]
    InvalidPageSize { items_per_page: u64 },

    /// The requested window cannot be addressed
    #[error("Page {page} with {items_per_page} items per page is out of range")]
    PageOutOfRange { page: u64, items_per_page: u64 },

    /// A query string parameter could not be parsed
    #[error("Invalid value '{value}' for parameter '{name}'")]
    InvalidParameter { name: String, value: String },

    /// No list is registered under this name
    #[error("List '{name}' not found")]
    UnknownList { name: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::UnknownList { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidPage { .. } => "INVALID_PAGE",
            RequestError::InvalidPageSize { .. } => "INVALID_PAGE_SIZE",
            RequestError::PageOutOfRange { .. } => "PAGE_OUT_OF_RANGE",
            RequestError::InvalidParameter { .. } => "INVALID_PARAMETER",
            RequestError::UnknownList { .. } => "LIST_NOT_FOUND",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors raised while validating a list configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The collection name is empty
    #[error("List configuration has an empty collection name")]
    EmptyCollection,

    /// A column reference is empty
    #[error("List configuration for '{collection}' has an empty {role} column")]
    EmptyColumn { collection: String, role: String },

    /// A search field is listed twice
    #[error("Search field '{field}' is listed more than once for '{collection}'")]
    DuplicateSearchField { collection: String, field: String },

    /// Two list definitions share a name
    #[error("List '{name}' is defined more than once")]
    DuplicateList { name: String },
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for list fetching
pub type FetchResult<T> = Result<T, FetchError>;
