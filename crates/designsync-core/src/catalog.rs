//! Wire format of the managed section
//!
//! Everything the engine writes into the document is produced here:
//! the section heading, the end sentinel, the per-entry protection markers,
//! the entry template, and cross-reference text.

use crate::types::{LinkFormat, ResolvedEntry};
use std::fmt::Write as _;

/// Title of the managed section heading (matched case-insensitively)
pub const SECTION_TITLE: &str = "Design Specs";

/// Heading written when the section has to be created
pub const SECTION_HEADING: &str = "## Design Specs";

/// Marks the end of a closed managed section
pub const SECTION_SENTINEL: &str = "<!-- design-specs:end -->";

/// Title prefix of each generated entry heading
pub const ENTRY_TITLE_PREFIX: &str = "Design Spec";

/// Anchor of entry `n`, matching the slug of its `### Design Spec n` heading
#[inline]
#[must_use]
pub fn anchor_id(entry_number: u32) -> String {
    format!("design-spec-{entry_number}")
}

/// Protection marker opening entry `number`
#[inline]
#[must_use]
pub fn entry_start_marker(number: impl std::fmt::Display) -> String {
    format!("<!-- START_design_spec_{number} -->")
}

/// Protection marker closing entry `number`
#[inline]
#[must_use]
pub fn entry_end_marker(number: impl std::fmt::Display) -> String {
    format!("<!-- END_design_spec_{number} -->")
}

/// Text that replaces a link found above the section
///
/// Labeled links keep their label; bare URLs get the entry title.
#[must_use]
pub fn cross_reference(format: &LinkFormat, entry_number: u32) -> String {
    let anchor = anchor_id(entry_number);
    match format {
        LinkFormat::Labeled(label) => format!("[{label}](#{anchor})"),
        LinkFormat::Plain => format!("[{ENTRY_TITLE_PREFIX} {entry_number}](#{anchor})"),
    }
}

/// Render one protected entry, terminated by a blank line
#[must_use]
pub fn render_entry(entry: &ResolvedEntry) -> String {
    let n = entry.entry_number;
    let mut out = String::with_capacity(512);

    // `write!` into a String cannot fail
    let _ = writeln!(out, "{}", entry_start_marker(n));
    let _ = writeln!(out, "### {ENTRY_TITLE_PREFIX} {n}");
    out.push('\n');
    let _ = writeln!(
        out,
        r#"<img src="{}" alt="{ENTRY_TITLE_PREFIX} {n} preview" width="800" />"#,
        entry.preview_asset_url
    );
    out.push('\n');
    out.push_str("<details>\n<summary>Version details</summary>\n\n");
    let _ = writeln!(
        out,
        "- Source: [{} / {}]({})",
        entry.object_id, entry.sub_object_id, entry.source_url
    );
    let _ = writeln!(out, "- Version: {}", entry.version_tag);
    let _ = writeln!(out, "- Version created: {}", entry.version_timestamp);
    let _ = writeln!(
        out,
        "- Preview expires: {}",
        entry.preview_expires_on.format("%Y-%m-%d")
    );
    out.push_str("</details>\n\n");
    out.push_str("Description: \n\n");
    let _ = writeln!(out, "{}", entry_end_marker(n));
    out.push('\n');
    out
}

/// Render a batch of entries in order
#[must_use]
pub fn render_entries(entries: &[ResolvedEntry]) -> String {
    entries.iter().map(render_entry).collect()
}
