//! Design link extraction
//!
//! Recognizes two forms over the same URL pattern:
//! - labeled: `[label](https://host/design/KEY/Name?node-id=1-2)`
//! - bare:    `https://host/design/KEY/Name?node-id=1-2`
//!
//! A URL is a design link only if it has an object segment
//! (`/file/`, `/design/`, `/proto/` or `/board/` followed by a key) and a
//! `node-id` query parameter. Anything else is ignored without error.

use crate::types::{LinkFormat, LinkMatch, LinkOrigin};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;

static LABELED_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[([^\]\n]*)\]\((https?://[^\s()<>"']+)\)"#).expect("static regex")
});

static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>()\[\]"']+"#).expect("static regex"));

/// Sentence punctuation and markdown emphasis / code-span delimiters that
/// end a bare URL without belonging to it
const TRAILING_NOISE: [char; 10] = ['.', ',', ';', ':', '!', '?', '*', '_', '`', '~'];

static OBJECT_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^/\s]+/(?:file|design|proto|board)/([0-9A-Za-z]+)(?:[/?#]|$)")
        .expect("static regex")
});

/// Identifiers carried by a design URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignUrl {
    /// File key
    pub object_id: String,
    /// Normalized node identifier
    pub sub_object_id: String,
    /// `version-id` parameter
    pub version_tag: Option<String>,
}

/// Parse a design URL
///
/// Returns `None` for URLs without an object segment or without `node-id`.
#[must_use]
pub fn parse_design_url(url: &str) -> Option<DesignUrl> {
    let object_id = OBJECT_SEGMENT.captures(url)?.get(1)?.as_str().to_string();

    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();

    let mut node_id = None;
    let mut version_tag = None;
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "node-id" if !value.is_empty() => node_id = Some(value),
            "version-id" if !value.is_empty() => version_tag = Some(value.to_string()),
            _ => {}
        }
    }

    Some(DesignUrl {
        object_id,
        sub_object_id: normalize_sub_object_id(node_id?),
        version_tag,
    })
}

/// Convert a URL node id into the colon form the design API expects
///
/// Only the first hyphen is the separator; later hyphens belong to the id.
/// Percent-encoded colons are decoded, and ids already in colon form are
/// returned unchanged.
#[must_use]
pub fn normalize_sub_object_id(raw: &str) -> String {
    let decoded = raw.replace("%3A", ":").replace("%3a", ":");
    if decoded.contains(':') {
        decoded
    } else {
        decoded.replacen('-', ":", 1)
    }
}

/// Extract every design link in `text`, in order of appearance
///
/// `base_offset` is added to each match so offsets refer to the full
/// document. Bare URLs inside a labeled link are not reported twice.
#[must_use]
pub fn extract_links(text: &str, base_offset: usize, origin: LinkOrigin) -> Vec<LinkMatch> {
    let mut labeled_spans: Vec<Range<usize>> = Vec::new();
    let mut matches = Vec::new();

    for caps in LABELED_LINK.captures_iter(text) {
        let (Some(whole), Some(label), Some(url)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        labeled_spans.push(whole.range());
        if let Some(parsed) = parse_design_url(url.as_str()) {
            matches.push(build_match(
                whole.as_str(),
                url.as_str(),
                parsed,
                base_offset + whole.start(),
                LinkFormat::Labeled(label.as_str().to_string()),
                origin,
            ));
        }
    }

    for found in BARE_URL.find_iter(text) {
        if labeled_spans
            .iter()
            .any(|span| span.start <= found.start() && found.start() < span.end)
        {
            continue;
        }
        let url = found.as_str().trim_end_matches(TRAILING_NOISE);
        let Some(parsed) = parse_design_url(url) else {
            continue;
        };

        // `<url>` autolinks are replaced brackets and all
        let end = found.start() + url.len();
        let span = if text[..found.start()].ends_with('<') && text[end..].starts_with('>') {
            found.start() - 1..end + 1
        } else {
            found.start()..end
        };
        matches.push(build_match(
            &text[span.clone()],
            url,
            parsed,
            base_offset + span.start,
            LinkFormat::Plain,
            origin,
        ));
    }

    matches.sort_by_key(|m| m.document_offset);
    matches
}

fn build_match(
    raw_text: &str,
    url: &str,
    parsed: DesignUrl,
    document_offset: usize,
    format: LinkFormat,
    origin: LinkOrigin,
) -> LinkMatch {
    LinkMatch {
        raw_text: raw_text.to_string(),
        url: url.to_string(),
        source_object_id: parsed.object_id,
        sub_object_id: parsed.sub_object_id,
        explicit_version_tag: parsed.version_tag,
        document_offset,
        format,
        origin,
    }
}

/// Links after URL deduplication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkScan {
    /// One match per URL, ordered by the URL's first appearance
    pub matches: Vec<LinkMatch>,
    /// Further occurrences of those URLs; they share the primary's entry
    pub duplicates: Vec<LinkMatch>,
}

impl LinkScan {
    /// Check if nothing was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// All occurrences, primaries first
    pub fn occurrences(&self) -> impl Iterator<Item = &LinkMatch> {
        self.matches.iter().chain(self.duplicates.iter())
    }
}

/// Deduplicate matches by URL
///
/// A labeled occurrence suppresses plain occurrences of the same URL;
/// otherwise the first occurrence is primary. The input must be in
/// discovery order, which the output preserves.
#[must_use]
pub fn dedupe_by_url(matches: Vec<LinkMatch>) -> LinkScan {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut primaries: Vec<LinkMatch> = Vec::new();
    let mut duplicates = Vec::new();

    for link in matches {
        match slots.get(&link.url) {
            None => {
                slots.insert(link.url.clone(), primaries.len());
                primaries.push(link);
            }
            Some(&slot) => {
                if link.format.is_labeled() && !primaries[slot].format.is_labeled() {
                    let demoted = std::mem::replace(&mut primaries[slot], link);
                    duplicates.push(demoted);
                } else {
                    duplicates.push(link);
                }
            }
        }
    }

    LinkScan {
        matches: primaries,
        duplicates,
    }
}
