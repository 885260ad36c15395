//! HTTP server layer for record-gate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          HTTP Layer                          │
//! │             /login   /data   /file   /file/{id}              │
//! │                                                              │
//! │  ┌─────────────┐ ┌────────────┐ ┌────────────┐ ┌──────────┐  │
//! │  │    auth     │ │   routes   │ │  handlers  │ │ response │  │
//! │  │(bearer gate)│ │ (dispatch) │ │ (requests) │ │  (JSON)  │  │
//! │  └─────────────┘ └────────────┘ └────────────┘ └──────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod response;
pub mod routes;

pub use auth::{auth_middleware, bearer_token, AuthError, Identity, LOGIN_PATH};
pub use handlers::{
    create_record_handler, delete_record_handler, download_file_handler, list_records_handler,
    login_handler, AppState, JsonBody, LoginCredentials, LoginRequest, OptionalIdentity,
};
pub use response::{ApiError, MessageResponse, TokenResponse, UploadResponse};
pub use routes::{
    create_dev_router, create_router, RouterConfig, DEFAULT_LOGIN, DEFAULT_MAX_BODY_BYTES,
};
