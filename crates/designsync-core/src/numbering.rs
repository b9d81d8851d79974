//! Catalog numbering
//!
//! Numbers are derived from the current section text on every run. There is
//! no persisted counter.

use crate::error::SyncError;
use crate::protect::protected_entries;
use once_cell::sync::Lazy;
use regex::Regex;

static ENTRY_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^ {0,3}#{1,6}[ \t]+Design Spec (\d+)[ \t]*\r?$").expect("static regex")
});

/// Count of entries already in the catalog
///
/// Complete protected pairs are counted; entry headings are the fallback
/// for sections without markers. If manual deletions left a higher number
/// than the count, the highest surviving number wins so new numbers never
/// collide with old ones.
#[must_use]
pub fn existing_entry_count(section_text: &str) -> u32 {
    let entries = protected_entries(section_text);
    let (count, highest) = if entries.is_empty() {
        let numbers: Vec<u32> = ENTRY_HEADING
            .captures_iter(section_text)
            .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
            .collect();
        (numbers.len(), numbers.into_iter().max())
    } else {
        (entries.len(), entries.iter().map(|e| e.number).max())
    };

    u32::try_from(count)
        .unwrap_or(u32::MAX)
        .max(highest.unwrap_or(0))
}

/// Hands out consecutive entry numbers for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogNumberer {
    existing: u32,
    assigned: u32,
}

impl CatalogNumberer {
    /// Start after `existing` entries
    #[inline]
    #[must_use]
    pub fn new(existing: u32) -> Self {
        Self {
            existing,
            assigned: 0,
        }
    }

    /// Start after the entries found in `section_text`
    #[inline]
    #[must_use]
    pub fn from_section(section_text: &str) -> Self {
        Self::new(existing_entry_count(section_text))
    }

    /// Entries present before this run
    #[inline]
    #[must_use]
    pub fn existing(&self) -> u32 {
        self.existing
    }

    /// Number of entries handed out so far
    #[inline]
    #[must_use]
    pub fn assigned(&self) -> u32 {
        self.assigned
    }

    /// Take the next number
    ///
    /// # Errors
    /// Returns [`SyncError::NumberingExhausted`] once the next number would
    /// not fit in a `u32`.
    pub fn next_number(&mut self) -> Result<u32, SyncError> {
        let number = self
            .existing
            .checked_add(self.assigned)
            .and_then(|n| n.checked_add(1))
            .ok_or(SyncError::NumberingExhausted {
                existing: self.existing,
            })?;
        self.assigned += 1;
        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{entry_end_marker, entry_start_marker};

    fn entry(n: u32) -> String {
        format!(
            "{}\n### Design Spec {n}\n{}\n\n",
            entry_start_marker(n),
            entry_end_marker(n)
        )
    }

    #[test]
    fn empty_section_starts_at_one() {
        let mut numberer = CatalogNumberer::from_section("");
        assert_eq!(numberer.existing(), 0);
        assert_eq!(numberer.next_number().unwrap(), 1);
        assert_eq!(numberer.next_number().unwrap(), 2);
        assert_eq!(numberer.assigned(), 2);
    }

    #[test]
    fn counts_protected_pairs() {
        let text = format!("\n{}{}", entry(1), entry(2));
        assert_eq!(existing_entry_count(&text), 2);
        assert_eq!(CatalogNumberer::from_section(&text).next_number().unwrap(), 3);
    }

    #[test]
    fn incomplete_pairs_do_not_count() {
        let text = format!("{}{}\n", entry(1), entry_start_marker(2));
        assert_eq!(existing_entry_count(&text), 1);
    }

    #[test]
    fn falls_back_to_entry_headings() {
        let text = "### Design Spec 1\nfoo\n### Design Spec 2\nbar\n";
        assert_eq!(existing_entry_count(text), 2);
    }

    #[test]
    fn deleted_entry_never_causes_reuse() {
        let text = format!("{}{}", entry(1), entry(3));
        assert_eq!(existing_entry_count(&text), 3);
    }

    #[test]
    fn highest_number_is_handed_out_once() {
        let mut numberer = CatalogNumberer::new(u32::MAX - 1);
        assert_eq!(numberer.next_number().unwrap(), u32::MAX);
        assert!(matches!(
            numberer.next_number(),
            Err(SyncError::NumberingExhausted { existing }) if existing == u32::MAX - 1
        ));
        assert_eq!(numberer.assigned(), 1);
    }

    #[test]
    fn maximal_marker_exhausts_numbering() {
        let text = entry(u32::MAX);
        assert_eq!(existing_entry_count(&text), u32::MAX);
        let err = CatalogNumberer::from_section(&text).next_number().unwrap_err();
        assert!(!err.requires_manual_fix());
        assert!(err.to_string().contains("4294967295"));
    }
}
