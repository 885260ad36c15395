use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while issuing a bearer token
#[derive(Debug, Error)]
pub enum TokenError {
    /// Claims could not be serialized to JSON
    #[error("Failed to encode token claims: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Errors raised while decoding a multipart upload body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultipartError {
    /// Content-Type header is missing or carries no boundary parameter
    #[error("Missing multipart boundary in Content-Type header")]
    MissingBoundary,

    /// The body does not contain `--{boundary}\r\n`
    #[error("Opening boundary delimiter not found")]
    MissingOpeningDelimiter,

    /// The body does not contain `\r\n--{boundary}--`
    #[error("Closing boundary delimiter not found")]
    MissingClosingDelimiter,

    /// A part's headers are not terminated by a blank line
    #[error("Part headers are not terminated by a blank line")]
    MissingHeaderTerminator,
}

/// Errors from the in-memory record store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record carries the requested id
    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    /// The id generator has no ids left
    #[error("Record ids are exhausted")]
    IdsExhausted,
}

/// Errors from the file catalog and its backing directory
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The storage directory could not be listed
    #[error("Failed to read storage directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No file is registered under the requested id
    #[error("File not found: {id}")]
    FileNotFound { id: u64 },

    /// The id generator has no ids left
    #[error("File ids are exhausted")]
    IdsExhausted,

    /// Reading or writing a stored file failed
    #[error("Storage I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
