//! Error types for the synchronization engine
//!
//! Provides error handling for:
//! - Structural problems in the managed document (fatal, nothing is written)
//! - Per-link enrichment failures (recoverable, the link is skipped)
//! - Document store and design provider collaborators

use std::path::PathBuf;
use std::sync::Arc;

/// Errors that abort a synchronization run
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// More than one managed-section heading exists
    #[error(
        "found {count} 'Design Specs' headings at byte offsets {offsets:?}; consolidate them into one section"
    )]
    AmbiguousSection {
        /// Number of matching headings
        count: usize,
        /// Byte offset of each heading line
        offsets: Vec<usize>,
    },

    /// A replacement no longer matches the snapshot it was computed from
    #[error("stale splice at offset {offset}: expected {expected:?}")]
    StaleOffset {
        /// Offset of the replacement
        offset: usize,
        /// Text the replacement expected to find
        expected: String,
    },

    /// Two replacements cover the same bytes
    #[error("overlapping replacements at offsets {first} and {second}")]
    OverlappingReplacements {
        /// Lower offset
        first: usize,
        /// Higher offset
        second: usize,
    },

    /// Next entry number would overflow
    #[error("entry numbers exhausted after {existing}; renumber the catalog entries")]
    NumberingExhausted {
        /// Highest number already in the catalog
        existing: u32,
    },

    /// Document store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Check if the error requires a human to edit the document
    #[inline]
    #[must_use]
    pub fn requires_manual_fix(&self) -> bool {
        matches!(self, Self::AmbiguousSection { .. })
    }
}

/// Failure enriching a single link
///
/// Never fatal: the link is logged and dropped from the batch.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Latest-version lookup failed
    #[error("version lookup failed for {object_id}: {source}")]
    Version {
        /// Design object identifier
        object_id: String,
        /// Shared provider error (lookups are deduplicated per object)
        #[source]
        source: Arc<ProviderError>,
    },

    /// Preview lookup failed
    #[error("preview lookup failed for {object_id} node {sub_object_id}: {source}")]
    Preview {
        /// Design object identifier
        object_id: String,
        /// Normalized sub-object identifier
        sub_object_id: String,
        /// Provider error
        #[source]
        source: ProviderError,
    },

    /// Provider has no preview for the node
    #[error("no preview available for {object_id} node {sub_object_id}")]
    PreviewNotFound {
        /// Design object identifier
        object_id: String,
        /// Normalized sub-object identifier
        sub_object_id: String,
    },
}

/// Errors raised by a [`crate::DesignProvider`]
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Non-success HTTP status
    #[error("http {status}: {message}")]
    Http {
        /// Status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Object has no versions
    #[error("no versions recorded for {0}")]
    NoVersions(String),
}

/// Errors raised by a [`crate::DocumentStore`]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Referenced document does not exist
    #[error("document not found: {0}")]
    NotFound(String),

    /// Non-success HTTP status
    #[error("http {status}: {message}")]
    Http {
        /// Status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Local file access failed
    #[error("io error on {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Store cannot serve this kind of reference
    #[error("unsupported document reference: {0}")]
    UnsupportedReference(String),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for engine operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_section_display() {
        let err = SyncError::AmbiguousSection {
            count: 2,
            offsets: vec![0, 40],
        };
        let message = err.to_string();
        assert!(message.contains("found 2"));
        assert!(message.contains("[0, 40]"));
        assert!(err.requires_manual_fix());
    }

    #[test]
    fn store_error_converts() {
        let err: SyncError = StoreError::NotFound("pr #4".to_string()).into();
        assert!(matches!(err, SyncError::Store(StoreError::NotFound(_))));
        assert!(!err.requires_manual_fix());
    }

    #[test]
    fn resolve_error_keeps_source() {
        use std::error::Error as _;

        let err = ResolveError::Version {
            object_id: "ABC".to_string(),
            source: Arc::new(ProviderError::NoVersions("ABC".to_string())),
        };
        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "version lookup failed for ABC: no versions recorded for ABC"
        );
    }
}
