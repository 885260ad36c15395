//! # record-gate
//!
//! A small HTTP service exposing authenticated CRUD over in-memory JSON
//! records, plus binary file upload and download.
//!
//! ## Features
//!
//! - **Bearer tokens**: Self-signed HMAC-SHA256 tokens issued by `/login`
//! - **Schema-less records**: Any JSON object can be stored under `/data`
//! - **File uploads**: Multipart uploads stored verbatim on disk, served by id
//! - **Rehydration**: Stored files are re-indexed from disk at startup
//!
//! ## Architecture
//!
//! - [`token`] - Token issuing and verification
//! - [`multipart`] - Multipart upload body decoder
//! - [`store`] - Record store, file catalog, and id generation
//! - [`server`] - Axum router, auth gate, handlers, and responses
//! - [`config`] - CLI and environment configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use record_gate::{create_router, FileCatalog, IdGenerator, ResourceStore, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let ids = Arc::new(IdGenerator::new());
//!     let records = ResourceStore::new(Arc::clone(&ids));
//!     let files = FileCatalog::load("file", ids).await.unwrap();
//!
//!     let router = create_router(records, files, RouterConfig::new("my-secret-key"));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod multipart;
pub mod server;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use config::Config;
pub use error::{CatalogError, MultipartError, StoreError, TokenError};
pub use multipart::{boundary_from_content_type, UploadedFile};
pub use server::{
    auth_middleware, create_dev_router, create_router, ApiError, AppState, AuthError, Identity,
    MessageResponse, RouterConfig,
};
pub use store::{FileCatalog, FileRecord, IdGenerator, Record, ResourceStore};
pub use token::{Claims, HmacTokenService, TokenService};
