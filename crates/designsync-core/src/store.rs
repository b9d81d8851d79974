//! Document store interface
//!
//! The store owns the document. A run fetches it once, treats that text as
//! the only source of truth, and writes back at most once.

use crate::error::StoreError;
use crate::types::DocumentRef;
use async_trait::async_trait;

/// Reads and writes whole documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the current text of a document
    async fn fetch_document(&self, reference: &DocumentRef) -> Result<String, StoreError>;

    /// Replace the text of a document
    async fn persist_document(&self, reference: &DocumentRef, text: &str) -> Result<(), StoreError>;
}
