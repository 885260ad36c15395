//! File catalog mapping file ids to their location on disk.
//!
//! The catalog is rehydrated once at startup by scanning the storage
//! directory: every file whose name starts with digits is registered under
//! that number. Uploads write the bytes first and register the record only
//! once the write has completed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tokio::fs::{self, File};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::CatalogError;

use super::ids::IdGenerator;

/// A stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// File id, as exposed under `/file/{id}`
    pub id: u64,

    /// Absolute path of the stored bytes
    pub location: PathBuf,
}

/// In-memory index of stored files.
pub struct FileCatalog {
    root: PathBuf,
    files: RwLock<HashMap<u64, FileRecord>>,
    ids: Arc<IdGenerator>,
}

impl FileCatalog {
    /// Create an empty catalog storing files under `root`.
    pub fn new(root: impl Into<PathBuf>, ids: Arc<IdGenerator>) -> Self {
        Self {
            root: root.into(),
            files: RwLock::new(HashMap::new()),
            ids,
        }
    }

    /// Build a catalog from the files already present under `root`.
    ///
    /// Entries without a leading numeric id are skipped. The id generator is
    /// advanced past the largest loaded id. Fails if the directory cannot be
    /// read.
    pub async fn load(root: impl Into<PathBuf>, ids: Arc<IdGenerator>) -> Result<Self, CatalogError> {
        let root = root.into();
        let read_dir_error = |source| CatalogError::ReadDir {
            path: root.clone(),
            source,
        };

        let absolute_root = fs::canonicalize(&root).await.map_err(read_dir_error)?;
        let mut entries = fs::read_dir(&absolute_root).await.map_err(read_dir_error)?;
        let mut files = HashMap::new();

        while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
            let file_type = entry.file_type().await.map_err(read_dir_error)?;
            let name = entry.file_name();
            let name = name.to_string_lossy();

            let id = match leading_id(&name) {
                Some(id) if file_type.is_file() => id,
                _ => {
                    debug!(entry = %name, "Skipping storage entry without a numeric id");
                    continue;
                }
            };

            ids.observe(id);
            files.insert(
                id,
                FileRecord {
                    id,
                    location: entry.path(),
                },
            );
        }

        info!(
            root = %absolute_root.display(),
            files = files.len(),
            "Loaded file catalog"
        );

        Ok(Self {
            root: absolute_root,
            files: RwLock::new(files),
            ids,
        })
    }

    /// Directory uploaded files are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of registered files.
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    /// Whether no files are registered.
    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }

    /// Add a record, replacing any previous record with the same id.
    pub async fn register(&self, record: FileRecord) {
        self.files.write().await.insert(record.id, record);
    }

    /// Look up a file by id.
    pub async fn find(&self, id: u64) -> Option<FileRecord> {
        self.files.read().await.get(&id).cloned()
    }

    /// Open a stored file for streaming.
    pub async fn open_for_read(&self, id: u64) -> Result<(File, FileRecord), CatalogError> {
        let record = self
            .find(id)
            .await
            .ok_or(CatalogError::FileNotFound { id })?;

        let file = File::open(&record.location)
            .await
            .map_err(|source| CatalogError::Io {
                path: record.location.clone(),
                source,
            })?;

        Ok((file, record))
    }

    /// Write `content` verbatim under a fresh id and register it.
    ///
    /// The record becomes visible only after the bytes have been written.
    pub async fn store(
        &self,
        content: &Bytes,
        extension: Option<&str>,
    ) -> Result<FileRecord, CatalogError> {
        let id = self.ids.next_id().ok_or(CatalogError::IdsExhausted)?;
        let name = match extension {
            Some(ext) => format!("{}.{}", id, ext),
            None => id.to_string(),
        };
        let location = self.root.join(name);

        fs::write(&location, content)
            .await
            .map_err(|source| CatalogError::Io {
                path: location.clone(),
                source,
            })?;

        let record = FileRecord { id, location };
        self.register(record.clone()).await;

        debug!(id, location = %record.location.display(), bytes = content.len(), "Stored upload");
        Ok(record)
    }
}

/// Parse the leading ASCII digits of a file name as an id.
fn leading_id(name: &str) -> Option<u64> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    name[..digits].parse().ok()
}
