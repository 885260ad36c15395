//! Router configuration for record-gate.
//!
//! # Route Structure
//!
//! ```text
//! /login        POST                   - Issue a token (public)
//! /data         GET, POST, PUT, DELETE - Record CRUD (protected)
//! /file         POST                   - Multipart upload (protected)
//! /file/{id}    GET                    - Download (protected)
//! ```
//!
//! The auth layer wraps the whole router, fallbacks included, so unknown paths
//! still answer 401 to unauthenticated callers. A known path requested with
//! another method answers 405.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use record_gate::server::{create_router, RouterConfig};
//! use record_gate::store::{FileCatalog, IdGenerator, ResourceStore};
//!
//! let ids = Arc::new(IdGenerator::new());
//! let records = ResourceStore::new(Arc::clone(&ids));
//! let files = FileCatalog::load("file", ids).await?;
//!
//! let router = create_router(records, files, RouterConfig::new("my-secret-key"));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::auth::{auth_middleware, LOGIN_PATH};
use super::handlers::{
    create_record_handler, delete_record_handler, download_file_handler,
    file_method_not_allowed_handler, list_records_handler, login_handler,
    method_not_allowed_handler, not_found_handler, replace_record_handler, upload_file_handler,
    AppState, LoginCredentials,
};
use crate::store::{FileCatalog, ResourceStore};
use crate::token::{HmacTokenService, TokenService};

/// Default login username and password.
pub const DEFAULT_LOGIN: &str = "admin";

/// Default maximum request body size: 64MB
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Secret key for signing bearer tokens
    pub auth_secret: String,

    /// Whether the bearer token gate is enforced
    pub auth_enabled: bool,

    /// Username accepted by `/login`
    pub login_username: String,

    /// Password accepted by `/login`
    pub login_password: String,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration with the given token secret.
    ///
    /// By default:
    /// - Authentication is enabled
    /// - Login accepts `admin` / `admin`
    /// - Bodies up to 64MB are accepted
    /// - Tracing is enabled
    pub fn new(auth_secret: impl Into<String>) -> Self {
        Self {
            auth_secret: auth_secret.into(),
            auth_enabled: true,
            login_username: DEFAULT_LOGIN.to_string(),
            login_password: DEFAULT_LOGIN.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            enable_tracing: true,
        }
    }

    /// Create a configuration with authentication disabled.
    ///
    /// **Warning**: This should only be used for local testing.
    pub fn without_auth() -> Self {
        Self {
            auth_enabled: false,
            ..Self::new(String::new())
        }
    }

    /// Set the credentials accepted by `/login`.
    pub fn with_login(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.login_username = username.into();
        self.login_password = password.into();
        self
    }

    /// Set the maximum request body size in bytes.
    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Enable or disable authentication.
    pub fn with_auth_enabled(mut self, enabled: bool) -> Self {
        self.auth_enabled = enabled;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `records` - Store backing `/data`
/// * `files` - Catalog backing `/file`
/// * `config` - Router configuration
pub fn create_router(records: ResourceStore, files: FileCatalog, config: RouterConfig) -> Router {
    let tokens: Arc<dyn TokenService> = Arc::new(HmacTokenService::new(&config.auth_secret));
    let login = LoginCredentials::new(&config.login_username, &config.login_password);
    let app_state = AppState::new(records, files, Arc::clone(&tokens), login);

    let router = Router::new()
        .route(
            LOGIN_PATH,
            post(login_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/data",
            get(list_records_handler)
                .post(create_record_handler)
                .put(replace_record_handler)
                .delete(delete_record_handler)
                .fallback(method_not_allowed_handler),
        )
        .route(
            "/file",
            post(upload_file_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/file/{id}",
            get(download_file_handler).fallback(file_method_not_allowed_handler),
        )
        .fallback(not_found_handler)
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes));

    // The gate runs before routing, so it must wrap the fallback as well.
    let router = if config.auth_enabled {
        router.layer(middleware::from_fn_with_state(tokens, auth_middleware))
    } else {
        router
    };

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Create a router with authentication disabled.
///
/// **Warning**: This should only be used for local testing.
pub fn create_dev_router(records: ResourceStore, files: FileCatalog) -> Router {
    create_router(records, files, RouterConfig::without_auth())
}

// =============================================================================
// Tests
// =============================================================================
