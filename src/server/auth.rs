//! Bearer token gate for the HTTP API.
//!
//! Every request except those to `/login` must carry
//!
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! The token is the second whitespace-delimited word of the header; the scheme
//! word itself is not inspected. Tokens are checked with the configured
//! [`TokenService`]; on success the decoded claims are attached to the request
//! as an [`Identity`] extension.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use axum::{middleware, Router};
//! use record_gate::server::auth::auth_middleware;
//! use record_gate::token::{HmacTokenService, TokenService};
//!
//! let tokens: Arc<dyn TokenService> = Arc::new(HmacTokenService::new("secret-key"));
//! let app = Router::new()
//!     .route("/data", get(list_records))
//!     .layer(middleware::from_fn_with_state(tokens, auth_middleware));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

use super::response::ApiError;
use crate::token::{Claims, TokenService};

/// Path that is reachable without a token.
pub const LOGIN_PATH: &str = "/login";

// =============================================================================
// Types
// =============================================================================

/// Authentication error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No Authorization header on the request
    #[error("No authorization info")]
    MissingAuthorization,

    /// Header present but the token is absent, malformed, or wrongly signed
    #[error("Invalid token")]
    InvalidToken,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self == AuthError::InvalidToken {
            warn!("Rejected request with an invalid bearer token");
        }
        ApiError::from(self).into_response()
    }
}

/// Identity of an authenticated caller, taken from the token claims.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Claims carried by the verified token
    pub claims: Claims,
}

impl Identity {
    /// The `username` claim, if present.
    pub fn username(&self) -> Option<&str> {
        self.claims.get("username").and_then(|v| v.as_str())
    }
}

/// Extract the bearer token from request headers.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?;

    value
        .to_str()
        .ok()
        .and_then(|value| value.split_whitespace().nth(1))
        .ok_or(AuthError::InvalidToken)
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Axum middleware enforcing the bearer token gate.
///
/// Requests to [`LOGIN_PATH`] pass through untouched. All other requests are
/// rejected with 401 unless they carry a token accepted by `tokens`.
pub async fn auth_middleware(
    State(tokens): State<Arc<dyn TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if request.uri().path() == LOGIN_PATH {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers())?;
    let claims = tokens.claims(token).ok_or(AuthError::InvalidToken)?;

    request.extensions_mut().insert(Identity { claims });
    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
