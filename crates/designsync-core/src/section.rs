//! Managed-section locator
//!
//! Finds the single `Design Specs` heading (any ATX level), the end
//! sentinel after it, and the next heading that closes an unterminated
//! section.

use crate::catalog::{SECTION_SENTINEL, SECTION_TITLE};
use crate::error::SyncError;
use crate::protect::{is_protected, protected_ranges};
use crate::types::SectionBounds;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^ {0,3}(#{1,6})[ \t]+(.*?)[ \t#]*\r?$").expect("static regex")
});

/// An ATX heading line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Start of the line
    pub offset: usize,
    /// First byte after the line and its newline
    pub line_end: usize,
    /// Number of `#`
    pub level: u8,
    /// Heading text without markers
    pub title: String,
}

impl Heading {
    /// Check if this heading names the managed section
    #[inline]
    #[must_use]
    pub fn is_managed(&self) -> bool {
        self.title.trim().eq_ignore_ascii_case(SECTION_TITLE)
    }
}

/// All ATX headings in `document`, in order
#[must_use]
pub fn headings(document: &str) -> Vec<Heading> {
    HEADING
        .captures_iter(document)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let hashes = caps.get(1)?;
            let title = caps.get(2)?;
            let line_end = match document[whole.end()..].find('\n') {
                Some(pos) => whole.end() + pos + 1,
                None => document.len(),
            };
            Some(Heading {
                offset: whole.start(),
                line_end,
                level: u8::try_from(hashes.len()).unwrap_or(6),
                title: title.as_str().to_string(),
            })
        })
        .collect()
}

/// Locate the managed section
///
/// # Errors
/// Returns [`SyncError::AmbiguousSection`] if more than one managed heading
/// exists. Zero headings is not an error: the bounds report `exists = false`.
pub fn locate_section(document: &str) -> Result<SectionBounds, SyncError> {
    let all = headings(document);
    let managed: Vec<&Heading> = all.iter().filter(|h| h.is_managed()).collect();

    let heading = match managed.as_slice() {
        [] => return Ok(SectionBounds::absent()),
        [only] => *only,
        many => {
            return Err(SyncError::AmbiguousSection {
                count: many.len(),
                offsets: many.iter().map(|h| h.offset).collect(),
            })
        }
    };

    let body_offset = heading.line_end;
    let rest = &document[body_offset..];

    let sentinel_offset = rest.find(SECTION_SENTINEL).map(|pos| body_offset + pos);

    // Entry headings inside protected entries never close the section
    let protected: Vec<_> = protected_ranges(rest)
        .into_iter()
        .map(|r| r.start + body_offset..r.end + body_offset)
        .collect();
    let next_sibling_heading_offset = all
        .iter()
        .filter(|h| h.offset >= body_offset)
        .filter(|h| !is_protected(h.offset, &protected))
        .find(|h| h.level <= heading.level)
        .map(|h| h.offset);

    Ok(SectionBounds {
        exists: true,
        heading_offset: heading.offset,
        body_offset,
        heading_level: heading.level,
        sentinel_offset,
        next_sibling_heading_offset,
    })
}
