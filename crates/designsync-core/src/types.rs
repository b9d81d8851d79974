//! Core types for the engine
//!
//! Defines:
//! - Link matches discovered in the document
//! - Enrichment data and numbered catalog entries
//! - Managed-section boundaries
//! - Document references understood by stores

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

/// Syntactic form of a discovered link
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkFormat {
    /// Bare URL
    Plain,
    /// Markdown link `[label](url)`
    Labeled(String),
}

impl LinkFormat {
    /// Check if the link carried its own label
    #[inline]
    #[must_use]
    pub fn is_labeled(&self) -> bool {
        matches!(self, Self::Labeled(_))
    }
}

/// Where a link was found relative to the managed section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkOrigin {
    /// Before the managed section heading (or anywhere, if the section is absent)
    AboveSection,
    /// Inside the managed section, outside every protected entry
    WithinSectionUnprotected,
}

/// A design link found in the document
///
/// `document_offset` refers to the snapshot the match was computed from and
/// is stale after any splice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMatch {
    /// Exact matched text (the whole `[label](url)` for labeled links)
    pub raw_text: String,
    /// The design URL (deduplication key)
    pub url: String,
    /// File key of the design object
    pub source_object_id: String,
    /// Normalized node identifier (`10:20`)
    pub sub_object_id: String,
    /// `version-id` query parameter, if present
    pub explicit_version_tag: Option<String>,
    /// Byte offset of `raw_text` in the document
    pub document_offset: usize,
    /// Plain or labeled
    pub format: LinkFormat,
    /// Above or within the managed section
    pub origin: LinkOrigin,
}

impl LinkMatch {
    /// Byte span of the match in its snapshot
    #[inline]
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.document_offset..self.document_offset + self.raw_text.len()
    }
}

/// Version record returned by a design provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Version identifier
    pub id: String,
    /// ISO-8601 creation timestamp
    pub created_at: String,
}

/// External data gathered for one link, before numbering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    /// Version the entry documents
    pub version: VersionInfo,
    /// Temporary preview image URL
    pub preview_asset_url: String,
    /// Date after which the preview URL is expected to be dead
    pub preview_expires_on: NaiveDate,
}

/// A numbered catalog entry ready to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    /// 1-based, unique within the document
    pub entry_number: u32,
    /// Derived from `entry_number` only
    pub anchor_id: String,
    /// Version identifier
    pub version_tag: String,
    /// ISO-8601 version timestamp
    pub version_timestamp: String,
    /// Preview image URL, embedded verbatim
    pub preview_asset_url: String,
    /// Resolution date plus the preview validity window
    pub preview_expires_on: NaiveDate,
    /// Original design URL
    pub source_url: String,
    /// File key
    pub object_id: String,
    /// Normalized node identifier
    pub sub_object_id: String,
}

impl ResolvedEntry {
    /// Number an enriched link
    #[must_use]
    pub fn new(entry_number: u32, link: &LinkMatch, enrichment: Enrichment) -> Self {
        Self {
            entry_number,
            anchor_id: crate::catalog::anchor_id(entry_number),
            version_tag: enrichment.version.id,
            version_timestamp: enrichment.version.created_at,
            preview_asset_url: enrichment.preview_asset_url,
            preview_expires_on: enrichment.preview_expires_on,
            source_url: link.url.clone(),
            object_id: link.source_object_id.clone(),
            sub_object_id: link.sub_object_id.clone(),
        }
    }
}

/// Boundaries of the managed section in one snapshot
///
/// Recomputed on every run; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionBounds {
    /// Whether a managed heading exists
    pub exists: bool,
    /// Start of the heading line
    pub heading_offset: usize,
    /// First byte after the heading line (including its newline)
    pub body_offset: usize,
    /// Number of `#` in the heading
    pub heading_level: u8,
    /// End sentinel, only when it follows the heading
    pub sentinel_offset: Option<usize>,
    /// Next heading of equal or heavier rank
    pub next_sibling_heading_offset: Option<usize>,
}

impl SectionBounds {
    /// Bounds for a document without a managed section
    #[inline]
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// Sentinel, else next sibling heading, else end of document
    #[must_use]
    pub fn effective_end(&self, document_len: usize) -> usize {
        self.sentinel_offset
            .filter(|&offset| offset >= self.body_offset)
            .or(self.next_sibling_heading_offset)
            .unwrap_or(document_len)
    }

    /// Body of the section (after the heading line, up to the effective end)
    #[must_use]
    pub fn body(&self, document_len: usize) -> Option<Range<usize>> {
        self.exists
            .then(|| self.body_offset..self.effective_end(document_len).max(self.body_offset))
    }

    /// Region scanned for links above the section
    #[must_use]
    pub fn above(&self, document_len: usize) -> Range<usize> {
        if self.exists {
            0..self.heading_offset
        } else {
            0..document_len
        }
    }
}

/// Address of a document in a store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentRef {
    /// Pull-request description
    PullRequest {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Pull-request number
        number: u64,
    },
    /// Local markdown file
    File(PathBuf),
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PullRequest {
                owner,
                repo,
                number,
            } => write!(f, "{owner}/{repo}#{number}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_end_prefers_sentinel() {
        let bounds = SectionBounds {
            exists: true,
            heading_offset: 10,
            body_offset: 26,
            heading_level: 2,
            sentinel_offset: Some(80),
            next_sibling_heading_offset: Some(60),
        };
        assert_eq!(bounds.effective_end(200), 80);
        assert_eq!(bounds.body(200), Some(26..80));
        assert_eq!(bounds.above(200), 0..10);
    }

    #[test]
    fn effective_end_falls_back() {
        let mut bounds = SectionBounds {
            exists: true,
            heading_offset: 0,
            body_offset: 16,
            heading_level: 2,
            sentinel_offset: None,
            next_sibling_heading_offset: Some(40),
        };
        assert_eq!(bounds.effective_end(100), 40);

        bounds.next_sibling_heading_offset = None;
        assert_eq!(bounds.effective_end(100), 100);
    }

    #[test]
    fn absent_section_scans_everything() {
        let bounds = SectionBounds::absent();
        assert_eq!(bounds.above(42), 0..42);
        assert_eq!(bounds.body(42), None);
    }

    #[test]
    fn document_ref_display() {
        let pr = DocumentRef::PullRequest {
            owner: "acme".to_string(),
            repo: "app".to_string(),
            number: 7,
        };
        assert_eq!(pr.to_string(), "acme/app#7");
    }
}
