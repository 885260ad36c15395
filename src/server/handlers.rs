//! HTTP request handlers for the record and file API.
//!
//! # Endpoints
//!
//! - `POST /login` - Exchange credentials for a bearer token
//! - `GET|POST|PUT|DELETE /data` - Record CRUD
//! - `POST /file` - Multipart upload
//! - `GET /file/{id}` - Raw download

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{
        rejection::BytesRejection, FromRequest, FromRequestParts, Path, RawQuery, Request, State,
    },
    http::{header, request::Parts, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use subtle::ConstantTimeEq;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};
use url::form_urlencoded;

use super::auth::Identity;
use super::response::{ApiError, MessageResponse, TokenResponse, UploadResponse};
use crate::error::{CatalogError, MultipartError};
use crate::multipart;
use crate::store::{record_id, FileCatalog, Record, ResourceStore, ID_FIELD};
use crate::token::{Claims, TokenService};

// =============================================================================
// Application State
// =============================================================================

/// Credentials accepted by `POST /login`.
#[derive(Clone)]
pub struct LoginCredentials {
    username: String,
    password: String,
}

impl LoginCredentials {
    /// Create the accepted credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check a submitted pair in constant time.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let username_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let password_ok = self.password.as_bytes().ct_eq(password.as_bytes());
        (username_ok & password_ok).into()
    }
}

/// Shared application state.
///
/// Built once at startup and passed to all handlers via Axum's State
/// extractor.
#[derive(Clone)]
pub struct AppState {
    /// Records exposed under `/data`
    pub records: Arc<ResourceStore>,

    /// Files exposed under `/file`
    pub files: Arc<FileCatalog>,

    /// Issues tokens on login
    pub tokens: Arc<dyn TokenService>,

    /// Credentials accepted on login
    pub login: Arc<LoginCredentials>,
}

impl AppState {
    /// Create application state from its parts.
    pub fn new(
        records: ResourceStore,
        files: FileCatalog,
        tokens: Arc<dyn TokenService>,
        login: LoginCredentials,
    ) -> Self {
        Self {
            records: Arc::new(records),
            files: Arc::new(files),
            tokens,
            login: Arc::new(login),
        }
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// JSON request body parsed with `serde_json`.
///
/// Unlike `axum::Json`, no `Content-Type` is required and every parse failure
/// is reported as a 400 with a `{message}` body.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(body_rejection)?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|err| ApiError::Validation(format!("Invalid JSON body: {}", err)))
    }
}

/// Caller identity attached by the auth middleware, if any.
///
/// Empty when authentication is disabled.
#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    /// Username for log fields; `-` when unknown.
    pub fn username(&self) -> &str {
        self.0
            .as_ref()
            .and_then(Identity::username)
            .unwrap_or("-")
    }
}

impl<S> FromRequestParts<S> for OptionalIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalIdentity(parts.extensions.get::<Identity>().cloned()))
    }
}

fn body_rejection(rejection: BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::Validation(rejection.body_text())
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

/// Extract the `id` query parameter, rejecting absent or empty values.
fn id_query_param(query: Option<&str>) -> Result<String, ApiError> {
    form_urlencoded::parse(query.unwrap_or("").as_bytes())
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(missing_id)
}

fn missing_id() -> ApiError {
    ApiError::Validation("Data id is not provided".to_string())
}

// =============================================================================
// Login
// =============================================================================

/// `POST /login`: issue a token for valid credentials.
pub async fn login_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if !state.login.matches(&request.username, &request.password) {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let mut claims = Claims::new();
    claims.insert("username".to_string(), Value::from(request.username.as_str()));
    let token = state.tokens.issue(&claims)?;

    info!(username = %request.username, "Issued token");
    Ok(Json(TokenResponse { token }))
}

// =============================================================================
// Records
// =============================================================================

/// `GET /data`: list all records.
pub async fn list_records_handler(State(state): State<AppState>) -> Json<Vec<Record>> {
    Json(state.records.list().await)
}

/// `POST /data`: create a record from the body.
pub async fn create_record_handler(
    State(state): State<AppState>,
    caller: OptionalIdentity,
    JsonBody(fields): JsonBody<Record>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let record = state.records.create(fields).await?;
    debug!(user = caller.username(), id = ?record_id(&record), "Created record");
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /data`: replace the record whose id is in the body.
pub async fn replace_record_handler(
    State(state): State<AppState>,
    caller: OptionalIdentity,
    JsonBody(fields): JsonBody<Record>,
) -> Result<Json<Record>, ApiError> {
    let id = match fields.get(ID_FIELD) {
        None | Some(Value::Null) => return Err(missing_id()),
        Some(_) => record_id(&fields).ok_or_else(|| {
            ApiError::Validation("Data id must be a non-negative integer".to_string())
        })?,
    };
    let record = state.records.replace(id, fields).await?;

    debug!(user = caller.username(), id, "Replaced record");
    Ok(Json(record))
}

/// `DELETE /data?id=<id>`: delete a record.
pub async fn delete_record_handler(
    State(state): State<AppState>,
    caller: OptionalIdentity,
    RawQuery(query): RawQuery,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = id_query_param(query.as_deref())?;
    state.records.delete(&id).await?;

    debug!(user = caller.username(), id = %id, "Deleted record");
    Ok(Json(MessageResponse::new("OK")))
}

// =============================================================================
// Files
// =============================================================================

/// `POST /file`: store the file part of a multipart body.
///
/// The body is buffered in full and the bytes are on disk before the file
/// becomes downloadable.
pub async fn upload_file_handler(
    State(state): State<AppState>,
    caller: OptionalIdentity,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let body = body.map_err(body_rejection)?;

    let boundary = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(multipart::boundary_from_content_type)
        .ok_or(MultipartError::MissingBoundary)?;

    let file = multipart::decode(&body, &boundary)?;
    let record = state.files.store(&file.content, file.extension()).await?;

    info!(
        user = caller.username(),
        id = record.id,
        filename = file.filename.as_deref().unwrap_or("-"),
        bytes = file.content.len(),
        "File uploaded"
    );

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        id: record.id,
    }))
}

/// `GET /file/{id}`: stream a stored file.
///
/// Non-numeric ids do not name a route and yield 404 `Route not found`.
pub async fn download_file_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    if !is_file_id(&id) {
        return Err(ApiError::route_not_found());
    }
    let id: u64 = id
        .parse()
        .map_err(|_| ApiError::NotFound("File not found".to_string()))?;

    let (file, record) = state.files.open_for_read(id).await?;
    let metadata = file.metadata().await.map_err(|source| CatalogError::Io {
        path: record.location.clone(),
        source,
    })?;

    debug!(id, bytes = metadata.len(), "Streaming file");

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (header::CONTENT_LENGTH, metadata.len().to_string()),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

// =============================================================================
// Fallbacks
// =============================================================================

/// Fallback for paths that match no route.
pub async fn not_found_handler() -> ApiError {
    ApiError::route_not_found()
}

/// Fallback for known paths requested with an unsupported method.
pub async fn method_not_allowed_handler(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

/// Fallback for `/file/{id}` with an unsupported method.
///
/// Only all-digit ids name a route; anything else is 404 for every method.
pub async fn file_method_not_allowed_handler(
    method: Method,
    Path(id): Path<String>,
) -> ApiError {
    if is_file_id(&id) {
        ApiError::MethodNotAllowed(method)
    } else {
        ApiError::route_not_found()
    }
}

/// Whether a `/file/{id}` path segment is a file id.
fn is_file_id(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

// =============================================================================
// Tests
// =============================================================================
