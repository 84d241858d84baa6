//! Error types for Element Variants operations
//!
//! This module provides the error handling system shared by the resolver,
//! the catalog and the HTTP server:
//! - Structured error types with descriptive messages
//! - Stable error codes for programmatic handling
//! - HTTP status code mapping for server integrations
//! - Error categories for grouping and filtering
//! - JSON-serializable error responses that never leak internals
//!
//! # Example
//!
//! ```rust
//! use ev_core::error::{EVError, ErrorCategory};
//!
//! fn handle_error(err: EVError) {
//!     match err.category() {
//!         ErrorCategory::Authentication => println!("Bad credentials"),
//!         ErrorCategory::NotFound => println!("Resource not found"),
//!         ErrorCategory::Validation => println!("Invalid input"),
//!         _ => println!("Other error"),
//!     }
//!
//!     // What the caller is allowed to see
//!     let _body = err.to_error_response();
//!     let _status = err.http_status_code();
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Element Variants operations
pub type Result<T> = std::result::Result<T, EVError>;

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing or rejected credentials (401)
    Authentication,
    /// Input validation failed (400)
    Validation,
    /// Authenticated but not the owner (403)
    Forbidden,
    /// Resource not found (404)
    NotFound,
    /// Resource conflict (409)
    Conflict,
    /// Internal server error (500)
    Internal,
}

/// Errors that can occur in Element Variants operations
#[derive(Error, Debug)]
pub enum EVError {
    // ═══════════════════════════════════════════════════════════════════════
    // Authentication errors
    // ═══════════════════════════════════════════════════════════════════════

    /// The integration request carried no API key
    #[error("API key is required")]
    MissingApiKey,

    /// The API key is unknown or belongs to an inactive website.
    /// The two cases are deliberately indistinguishable.
    #[error("Invalid API key or inactive website")]
    InvalidApiKey,

    /// A management call arrived without an authenticated principal
    #[error("Unauthorized")]
    Unauthenticated,

    // ═══════════════════════════════════════════════════════════════════════
    // Validation errors (write side and request payloads)
    // ═══════════════════════════════════════════════════════════════════════

    /// Generic input validation failure
    #[error("{reason}")]
    InvalidInput { reason: String },

    /// Domain does not look like a host name
    #[error("Invalid domain format: '{domain}'")]
    InvalidDomain { domain: String },

    /// Condition type outside the vocabulary
    #[error("conditionType must be one of: {allowed}")]
    InvalidConditionType { value: String, allowed: String },

    /// Operator outside the vocabulary
    #[error("operator must be one of: {allowed}")]
    InvalidOperator { value: String, allowed: String },

    /// Elements must keep at least one variant
    #[error("Cannot delete the only variant. Elements must have at least one variant.")]
    CannotDeleteOnlyVariant { variant_id: String },

    /// The default variant must be replaced before it can be deleted
    #[error("Cannot delete the default variant. Please set another variant as default first.")]
    CannotDeleteDefaultVariant { variant_id: String },

    /// The integration request body is not a valid context payload
    #[error("Invalid context payload: {reason}")]
    InvalidContextPayload { reason: String },

    // ═══════════════════════════════════════════════════════════════════════
    // Ownership and lookup errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Website exists but belongs to someone else
    #[error("Website '{website_id}' is not owned by the caller")]
    WebsiteForbidden { website_id: String },

    #[error("Website not found: '{website_id}'")]
    WebsiteNotFound { website_id: String },

    #[error("Element not found or not owned by user: '{element_id}'")]
    ElementNotFound { element_id: String },

    #[error("Variant not found or not owned by user: '{variant_id}'")]
    VariantNotFound { variant_id: String },

    #[error("Condition not found or not owned by user: '{condition_id}'")]
    ConditionNotFound { condition_id: String },

    /// The owner already registered this domain
    #[error("Domain already registered: '{domain}'")]
    DomainAlreadyRegistered { domain: String },

    // ═══════════════════════════════════════════════════════════════════════
    // Infrastructure errors (serialization, storage, I/O)
    // ═══════════════════════════════════════════════════════════════════════

    /// JSON serialization or deserialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Storage backend lock is poisoned (panic occurred while holding lock)
    #[error("Storage backend lock poisoned. This is a bug; please report it.")]
    StorageLocked,

    /// I/O operation failed
    #[error("IO error: {message}")]
    IoError { message: String },

    /// Internal error that shouldn't happen
    #[error("Internal error: {reason}. This is a bug; please report it.")]
    InternalError { reason: String },
}

impl EVError {
    /// Shorthand for [`EVError::InvalidInput`]
    pub fn invalid(reason: impl Into<String>) -> Self {
        EVError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Returns true if this error is a client error (4xx equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(self.http_status_code(), 400..=499)
    }

    /// Returns true if this error is a server error (5xx equivalent)
    pub fn is_server_error(&self) -> bool {
        matches!(self.http_status_code(), 500..=599)
    }

    /// Returns the error category for grouping
    pub fn category(&self) -> ErrorCategory {
        match self {
            EVError::MissingApiKey
            | EVError::InvalidApiKey
            | EVError::Unauthenticated => ErrorCategory::Authentication,

            EVError::InvalidInput { .. }
            | EVError::InvalidDomain { .. }
            | EVError::InvalidConditionType { .. }
            | EVError::InvalidOperator { .. }
            | EVError::CannotDeleteOnlyVariant { .. }
            | EVError::CannotDeleteDefaultVariant { .. }
            | EVError::InvalidContextPayload { .. } => ErrorCategory::Validation,

            EVError::WebsiteForbidden { .. } => ErrorCategory::Forbidden,

            EVError::WebsiteNotFound { .. }
            | EVError::ElementNotFound { .. }
            | EVError::VariantNotFound { .. }
            | EVError::ConditionNotFound { .. } => ErrorCategory::NotFound,

            EVError::DomainAlreadyRegistered { .. } => ErrorCategory::Conflict,

            EVError::JsonError(_)
            | EVError::StorageLocked
            | EVError::IoError { .. }
            | EVError::InternalError { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            EVError::MissingApiKey => "MISSING_API_KEY",
            EVError::InvalidApiKey => "INVALID_API_KEY",
            EVError::Unauthenticated => "UNAUTHENTICATED",
            EVError::InvalidInput { .. } => "INVALID_INPUT",
            EVError::InvalidDomain { .. } => "INVALID_DOMAIN",
            EVError::InvalidConditionType { .. } => "INVALID_CONDITION_TYPE",
            EVError::InvalidOperator { .. } => "INVALID_OPERATOR",
            EVError::CannotDeleteOnlyVariant { .. } => "CANNOT_DELETE_ONLY_VARIANT",
            EVError::CannotDeleteDefaultVariant { .. } => "CANNOT_DELETE_DEFAULT_VARIANT",
            EVError::InvalidContextPayload { .. } => "INVALID_CONTEXT_PAYLOAD",
            EVError::WebsiteForbidden { .. } => "WEBSITE_FORBIDDEN",
            EVError::WebsiteNotFound { .. } => "WEBSITE_NOT_FOUND",
            EVError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            EVError::VariantNotFound { .. } => "VARIANT_NOT_FOUND",
            EVError::ConditionNotFound { .. } => "CONDITION_NOT_FOUND",
            EVError::DomainAlreadyRegistered { .. } => "DOMAIN_ALREADY_REGISTERED",
            EVError::JsonError(_) => "JSON_ERROR",
            EVError::StorageLocked => "STORAGE_LOCKED",
            EVError::IoError { .. } => "IO_ERROR",
            EVError::InternalError { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Authentication => 401,
            ErrorCategory::Validation => 400,
            ErrorCategory::Forbidden => 403,
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            ErrorCategory::Internal => 500,
        }
    }

    /// The message a remote caller is allowed to see
    ///
    /// Server-side failures collapse to a generic message; their detail
    /// belongs in the server log only.
    pub fn public_message(&self) -> String {
        if matches!(self, EVError::InvalidContextPayload { .. }) {
            return "Invalid context payload".to_string();
        }
        match self.category() {
            ErrorCategory::Internal => "Internal server error".to_string(),
            ErrorCategory::Forbidden => "Unauthorized".to_string(),
            _ => self.to_string(),
        }
    }

    /// Converts this error to a JSON-serializable response object
    ///
    /// ```json
    /// { "error": "Invalid API key or inactive website", "code": "INVALID_API_KEY" }
    /// ```
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.public_message(),
            code: self.error_code().to_string(),
        }
    }
}

/// JSON-serializable error response for APIs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable, caller-safe message
    pub error: String,
    /// Stable error code (e.g., "INVALID_API_KEY")
    pub code: String,
}

/// A single element could not be resolved because its stored data is malformed
///
/// Never surfaced to the caller: the element is left out of the response
/// and the remaining elements are still resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElementResolutionError {
    /// The element has no usable selector
    #[error("Element '{element_id}' has a blank selector")]
    BlankSelector { element_id: String },
}

impl ElementResolutionError {
    /// Id of the element that failed
    pub fn element_id(&self) -> &str {
        match self {
            ElementResolutionError::BlankSelector { element_id } => element_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_share_status() {
        assert_eq!(EVError::MissingApiKey.http_status_code(), 401);
        assert_eq!(EVError::InvalidApiKey.http_status_code(), 401);
        assert_eq!(EVError::Unauthenticated.http_status_code(), 401);
        assert!(EVError::InvalidApiKey.is_client_error());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(EVError::InvalidApiKey.error_code(), "INVALID_API_KEY");
        assert_eq!(
            EVError::VariantNotFound {
                variant_id: "v1".to_string()
            }
            .error_code(),
            "VARIANT_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(EVError::invalid("name is required").http_status_code(), 400);
        assert_eq!(
            EVError::WebsiteForbidden {
                website_id: "w".to_string()
            }
            .http_status_code(),
            403
        );
        assert_eq!(
            EVError::ElementNotFound {
                element_id: "e".to_string()
            }
            .http_status_code(),
            404
        );
        assert_eq!(
            EVError::DomainAlreadyRegistered {
                domain: "example.com".to_string()
            }
            .http_status_code(),
            409
        );
        assert_eq!(EVError::StorageLocked.http_status_code(), 500);
    }

    #[test]
    fn test_internal_errors_do_not_leak() {
        let err = EVError::IoError {
            message: "/var/lib/ev/sites.json: permission denied".to_string(),
        };
        assert!(err.is_server_error());
        let response = err.to_error_response();
        assert_eq!(response.error, "Internal server error");
        assert_eq!(response.code, "IO_ERROR");
    }

    #[test]
    fn test_context_payload_detail_stays_internal() {
        let err = EVError::InvalidContextPayload {
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.public_message(), "Invalid context payload");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_error_response_serialization() {
        let response = EVError::InvalidApiKey.to_error_response();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "Invalid API key or inactive website");
        assert_eq!(json["code"], "INVALID_API_KEY");
    }

    #[test]
    fn test_element_resolution_error_id() {
        let err = ElementResolutionError::BlankSelector {
            element_id: "el-1".to_string(),
        };
        assert_eq!(err.element_id(), "el-1");
        assert!(err.to_string().contains("blank selector"));
    }
}
