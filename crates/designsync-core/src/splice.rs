//! Document splicer
//!
//! Two mutations, applied in order:
//! 1. Replace matched link spans (a fold over replacements).
//! 2. Insert rendered entries at the point chosen by [`InsertionPlan`].

use crate::catalog::{SECTION_HEADING, SECTION_SENTINEL};
use crate::error::SyncError;
use crate::types::SectionBounds;

/// Replace `original` at `offset` with `text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Byte offset in the snapshot the replacement was planned against
    pub offset: usize,
    /// Text expected at `offset`
    pub original: String,
    /// Replacement text (empty to delete)
    pub text: String,
}

impl Replacement {
    /// End of the replaced span
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.original.len()
    }

    fn apply(mut document: String, replacement: Self) -> Result<String, SyncError> {
        let span = replacement.offset..replacement.end();
        if document.get(span.clone()) != Some(replacement.original.as_str()) {
            return Err(SyncError::StaleOffset {
                offset: replacement.offset,
                expected: replacement.original,
            });
        }
        document.replace_range(span, &replacement.text);
        Ok(document)
    }
}

/// Apply all replacements planned against `document`
///
/// Replacements are folded from the highest offset down so every offset
/// still refers to untouched text when it is applied.
///
/// # Errors
/// Returns [`SyncError::OverlappingReplacements`] if two spans intersect and
/// [`SyncError::StaleOffset`] if a span does not hold its expected text.
pub fn apply_replacements(
    document: String,
    mut replacements: Vec<Replacement>,
) -> Result<String, SyncError> {
    replacements.sort_by_key(|r| r.offset);
    if let Some(pair) = replacements.windows(2).find(|w| w[0].end() > w[1].offset) {
        return Err(SyncError::OverlappingReplacements {
            first: pair[0].offset,
            second: pair[1].offset,
        });
    }

    replacements
        .into_iter()
        .rev()
        .try_fold(document, Replacement::apply)
}

/// Where new entries go, decided from the current section bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionPlan {
    /// Section is closed: insert right before the sentinel
    BeforeSentinel {
        /// Sentinel offset
        offset: usize,
    },
    /// Section is open and followed by a heading: close it there
    SentinelBeforeHeading {
        /// Offset of the following heading
        offset: usize,
    },
    /// Section is open and runs to the end: append entries and sentinel
    AppendWithSentinel,
    /// No section: append heading, entries and sentinel
    CreateSection,
}

impl InsertionPlan {
    /// Decision table over section × sentinel × next heading
    #[must_use]
    pub fn decide(bounds: &SectionBounds) -> Self {
        match (
            bounds.exists,
            bounds.sentinel_offset,
            bounds.next_sibling_heading_offset,
        ) {
            (false, _, _) => Self::CreateSection,
            (true, Some(offset), _) => Self::BeforeSentinel { offset },
            (true, None, Some(offset)) => Self::SentinelBeforeHeading { offset },
            (true, None, None) => Self::AppendWithSentinel,
        }
    }
}

/// Insert rendered `entries` into `document` according to `plan`
#[must_use]
pub fn insert_entries(mut document: String, plan: InsertionPlan, entries: &str) -> String {
    match plan {
        InsertionPlan::BeforeSentinel { offset } => {
            let mut block = String::with_capacity(entries.len() + 1);
            if !starts_line(&document, offset) {
                block.push('\n');
            }
            block.push_str(entries);
            document.insert_str(offset, &block);
        }
        InsertionPlan::SentinelBeforeHeading { offset } => {
            let mut block = String::with_capacity(entries.len() + SECTION_SENTINEL.len() + 3);
            if !starts_line(&document, offset) {
                block.push('\n');
            }
            block.push_str(entries);
            block.push_str(SECTION_SENTINEL);
            block.push_str("\n\n");
            document.insert_str(offset, &block);
        }
        InsertionPlan::AppendWithSentinel => {
            end_line(&mut document);
            document.push_str(entries);
            document.push_str(SECTION_SENTINEL);
            document.push('\n');
        }
        InsertionPlan::CreateSection => {
            if !document.is_empty() {
                end_line(&mut document);
                document.push('\n');
            }
            document.push_str(SECTION_HEADING);
            document.push_str("\n\n");
            document.push_str(entries);
            document.push_str(SECTION_SENTINEL);
            document.push('\n');
        }
    }
    document
}

fn starts_line(document: &str, offset: usize) -> bool {
    offset == 0 || document[..offset].ends_with('\n')
}

fn end_line(document: &mut String) {
    if !document.is_empty() && !document.ends_with('\n') {
        document.push('\n');
    }
}
