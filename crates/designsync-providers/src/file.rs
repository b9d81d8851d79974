//! Local file store
//!
//! Used for dry runs and for syncing a description drafted on disk.

use async_trait::async_trait;
use designsync_core::{DocumentRef, DocumentStore, StoreError};
use std::path::Path;

/// [`DocumentStore`] backed by files on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDocumentStore;

impl FileDocumentStore {
    /// Create file store
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn file_path(reference: &DocumentRef) -> Result<&Path, StoreError> {
    match reference {
        DocumentRef::File(path) => Ok(path.as_path()),
        DocumentRef::PullRequest { .. } => {
            Err(StoreError::UnsupportedReference(reference.to_string()))
        }
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn fetch_document(&self, reference: &DocumentRef) -> Result<String, StoreError> {
        let path = file_path(reference)?;
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(StoreError::io_error(path, e)),
        }
    }

    async fn persist_document(&self, reference: &DocumentRef, text: &str) -> Result<(), StoreError> {
        let path = file_path(reference)?;
        tracing::info!(path = %path.display(), bytes = text.len(), "writing document");
        tokio::fs::write(path, text)
            .await
            .map_err(|e| StoreError::io_error(path, e))
    }
}
