//! JSON response encoding and the HTTP error taxonomy.
//!
//! Successful handlers return `(StatusCode, Json<T>)`. Failures are expressed
//! as [`ApiError`], which renders as the matching status code with a
//! `{"message": "..."}` body. File downloads bypass this module and stream raw
//! bytes.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::error::{CatalogError, MultipartError, StoreError, TokenError};

// =============================================================================
// Response Bodies
// =============================================================================

/// Body of every error response, and of plain acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

impl MessageResponse {
    /// Create a message body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Signed bearer token
    pub token: String,
}

/// Successful upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Human-readable message
    pub message: String,

    /// Id under which the file can be downloaded
    pub id: u64,
}

// =============================================================================
// Error Taxonomy
// =============================================================================

/// Every failure a request can end in.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid credential (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Missing or malformed input (400)
    #[error("{0}")]
    Validation(String),

    /// Unknown record, file, or route (404)
    #[error("{0}")]
    NotFound(String),

    /// Known path, unsupported verb (405)
    #[error("Method '{}' is not allowed", .0.as_str().to_ascii_lowercase())]
    MethodNotAllowed(Method),

    /// Upload body is not a usable multipart body (400)
    #[error("Invalid file content: {0}")]
    UploadFormat(#[from] MultipartError),

    /// Request body exceeds the configured limit (413)
    #[error("Request body is too large")]
    PayloadTooLarge,

    /// File storage read or write failed (500)
    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: CatalogError,
    },

    /// Any other server-side failure (500)
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::UploadFormat(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Storage { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error for request paths that match no route.
    pub fn route_not_found() -> Self {
        ApiError::NotFound("Route not found".to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RecordNotFound { .. } => ApiError::NotFound("Data not found".to_string()),
            StoreError::IdsExhausted => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::FileNotFound { .. } => ApiError::NotFound("File not found".to_string()),
            CatalogError::IdsExhausted => ApiError::Internal(err.to_string()),
            CatalogError::ReadDir { .. } => ApiError::Storage {
                message: "Error while reading file storage".to_string(),
                source: err,
            },
            CatalogError::Io { .. } => ApiError::Storage {
                message: "Error while accessing the file".to_string(),
                source: err,
            },
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Convert ApiError to an HTTP response.
///
/// 5xx errors are logged at ERROR level with their cause; authentication
/// failures at DEBUG; other client errors at WARN.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        match &self {
            ApiError::Storage { source, .. } => {
                error!(status = status.as_u16(), error = %source, "{}", message);
            }
            ApiError::Internal(cause) => {
                error!(status = status.as_u16(), error = %cause, "{}", message);
            }
            ApiError::Unauthorized(_) => {
                debug!(status = status.as_u16(), "Authentication failed: {}", message);
            }
            _ => {
                warn!(status = status.as_u16(), "Request failed: {}", message);
            }
        }

        (status, Json(MessageResponse::new(message))).into_response()
    }
}
