//! Protected-region filter
//!
//! A protected entry runs from `<!-- START_design_spec_N -->` through the
//! next `<!-- END_design_spec_N -->` carrying the same `N`. Unpaired or
//! mismatched markers protect nothing.

use crate::catalog::entry_end_marker;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static ENTRY_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!-- START_design_spec_(\d+) -->").expect("static regex"));

/// A complete protected entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedEntry {
    /// Entry number shared by both markers
    pub number: u32,
    /// Byte span from the start marker through the end marker
    pub span: Range<usize>,
}

/// Find every complete protected entry in `text`, in order
#[must_use]
pub fn protected_entries(text: &str) -> Vec<ProtectedEntry> {
    let mut entries = Vec::new();
    let mut cursor = 0;

    for caps in ENTRY_START.captures_iter(text) {
        let (Some(start), Some(digits)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if start.start() < cursor {
            continue;
        }
        let end_marker = entry_end_marker(digits.as_str());
        let Some(found) = text[start.end()..].find(&end_marker) else {
            tracing::debug!(marker = start.as_str(), "unpaired start marker left unprotected");
            continue;
        };
        let Ok(number) = digits.as_str().parse::<u32>() else {
            continue;
        };
        let end = start.end() + found + end_marker.len();
        entries.push(ProtectedEntry {
            number,
            span: start.start()..end,
        });
        cursor = end;
    }

    entries
}

/// Byte ranges of complete protected entries in `text`
#[must_use]
pub fn protected_ranges(text: &str) -> Vec<Range<usize>> {
    protected_entries(text).into_iter().map(|e| e.span).collect()
}

/// `text` with every complete protected entry removed
#[must_use]
pub fn strip_protected(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in protected_ranges(text) {
        out.push_str(&text[cursor..range.start]);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Parts of `region` not covered by `protected`
///
/// `protected` must be sorted, non-overlapping, and in the same coordinate
/// space as `region`.
#[must_use]
pub fn unprotected_segments(region: Range<usize>, protected: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut segments = Vec::new();
    let mut cursor = region.start;
    for range in protected {
        let start = range.start.clamp(region.start, region.end);
        let end = range.end.clamp(region.start, region.end);
        if start > cursor {
            segments.push(cursor..start);
        }
        cursor = cursor.max(end);
    }
    if cursor < region.end {
        segments.push(cursor..region.end);
    }
    segments
}

/// Check if `offset` falls inside any of `ranges`
#[inline]
#[must_use]
pub fn is_protected(offset: usize, ranges: &[Range<usize>]) -> bool {
    ranges.iter().any(|range| range.contains(&offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY_ONE: &str = "<!-- START_design_spec_1 -->\nbody one\n<!-- END_design_spec_1 -->";

    #[test]
    fn strips_complete_pair() {
        let text = format!("before\n{ENTRY_ONE}\nafter");
        assert_eq!(strip_protected(&text), "before\n\nafter");
    }

    #[test]
    fn reports_entry_numbers_and_spans() {
        let text = format!("x{ENTRY_ONE}");
        let entries = protected_entries(&text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].number, 1);
        assert_eq!(entries[0].span, 1..text.len());
    }

    #[test]
    fn mismatched_numbers_are_unprotected() {
        let text = "<!-- START_design_spec_1 -->\nkeep me\n<!-- END_design_spec_2 -->";
        assert!(protected_ranges(text).is_empty());
        assert_eq!(strip_protected(text), text);
    }

    #[test]
    fn unpaired_start_does_not_swallow_later_entry() {
        let text = "<!-- START_design_spec_1 -->\nstray\n\
                    <!-- START_design_spec_2 -->\nb\n<!-- END_design_spec_2 -->\ntail";
        let entries = protected_entries(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].number, 2);
        assert_eq!(
            strip_protected(text),
            "<!-- START_design_spec_1 -->\nstray\n\ntail"
        );
    }

    #[test]
    fn lone_end_marker_is_ignored() {
        let text = "text\n<!-- END_design_spec_3 -->\nmore";
        assert_eq!(strip_protected(text), text);
    }

    #[test]
    fn multiple_pairs() {
        let two = "<!-- START_design_spec_2 -->\nb\n<!-- END_design_spec_2 -->";
        let text = format!("{ENTRY_ONE}\nmid\n{two}\n");
        assert_eq!(protected_ranges(&text).len(), 2);
        assert_eq!(strip_protected(&text), "\nmid\n\n");
    }

    #[test]
    fn segments_skip_protected_ranges() {
        let segments = unprotected_segments(10..50, &[15..20, 30..50]);
        assert_eq!(segments, vec![10..15, 20..30]);

        let whole = unprotected_segments(0..8, &[]);
        assert_eq!(whole, vec![0..8]);
    }

    #[test]
    fn offset_membership() {
        assert!(is_protected(16, &[15..20]));
        assert!(!is_protected(20, &[15..20]));
    }
}
