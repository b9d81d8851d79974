//! End-to-end properties of the synchronization engine.
//!
//! Each test drives `Synchronizer::synchronize` over a whole document with
//! a scripted provider and a frozen clock, then checks the text that would
//! be persisted.

use designsync_core::catalog::{render_entries, SECTION_SENTINEL};
use designsync_core::prelude::*;
use designsync_core::{ResolvedEntry, SyncOutcome};
use designsync_test_utils::{design_url, setup_synchronizer, FixedClock, MockDesignProvider};
use pretty_assertions::assert_eq;
use std::sync::Arc;

async fn sync_once(document: &str) -> SyncOutcome {
    setup_synchronizer(Arc::new(MockDesignProvider::new()))
        .synchronize(document)
        .await
        .expect("synchronization should succeed")
}

fn existing_entry(number: u32, node: &str) -> ResolvedEntry {
    ResolvedEntry {
        entry_number: number,
        anchor_id: designsync_core::catalog::anchor_id(number),
        version_tag: "V0".to_string(),
        version_timestamp: "2024-12-01T00:00:00Z".to_string(),
        preview_asset_url: "https://img.example/old.png".to_string(),
        preview_expires_on: chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        source_url: design_url("OLD", node),
        object_id: "OLD".to_string(),
        sub_object_id: node.replacen('-', ":", 1),
    }
}

/// The reference scenario: one bare link, no section yet.
#[tokio::test]
async fn end_to_end_single_link() {
    let outcome = sync_once("See https://tool.example/design/ABC123/Name?node-id=10-20").await;

    let expected = "See [Design Spec 1](#design-spec-1)\n\
\n\
## Design Specs\n\
\n\
<!-- START_design_spec_1 -->\n\
### Design Spec 1\n\
\n\
<img src=\"https://img.example/p.png\" alt=\"Design Spec 1 preview\" width=\"800\" />\n\
\n\
<details>\n\
<summary>Version details</summary>\n\
\n\
- Source: [ABC123 / 10:20](https://tool.example/design/ABC123/Name?node-id=10-20)\n\
- Version: V1\n\
- Version created: 2025-01-01T00:00:00Z\n\
- Preview expires: 2025-01-31\n\
</details>\n\
\n\
Description: \n\
\n\
<!-- END_design_spec_1 -->\n\
\n\
<!-- design-specs:end -->\n";

    assert!(outcome.changed);
    assert_eq!(outcome.document, expected);
    assert_eq!(outcome.entries.len(), 1);
    assert_eq!(outcome.entries[0].entry_number, 1);
    assert_eq!(outcome.entries[0].sub_object_id, "10:20");
    assert_eq!(outcome.entries[0].version_tag, "V1");
    assert_eq!(
        outcome.entries[0].preview_expires_on,
        FixedClock::default().0.date_naive() + chrono::Days::new(30)
    );
}

/// Running twice with no new links is the same as running once.
#[tokio::test]
async fn second_run_is_a_noop() {
    let doc = format!(
        "Flows:\n- {}\n- [Checkout]({})\n",
        design_url("AAA", "1-2"),
        design_url("BBB", "3-4-5")
    );

    let first = sync_once(&doc).await;
    let second = sync_once(&first.document).await;

    assert!(first.changed);
    assert!(!second.changed);
    assert!(second.entries.is_empty());
    assert_eq!(second.document, first.document);
}

/// A new link added after the first run is appended as the next entry.
#[tokio::test]
async fn later_links_continue_numbering() {
    let first = sync_once(&format!("{}\n", design_url("AAA", "1-2"))).await;
    let edited = format!("Also {}\n{}", design_url("CCC", "7-8"), first.document);

    let second = sync_once(&edited).await;

    assert_eq!(second.entries.len(), 1);
    assert_eq!(second.entries[0].entry_number, 2);
    assert_eq!(second.document.matches(SECTION_SENTINEL).count(), 1);
    let one = second.document.find("<!-- START_design_spec_1 -->").unwrap();
    let two = second.document.find("<!-- START_design_spec_2 -->").unwrap();
    let end = second.document.find(SECTION_SENTINEL).unwrap();
    assert!(one < two && two < end);
}

/// Protected entries stay byte-identical; only the stray link changes.
#[tokio::test]
async fn protected_entry_is_untouched() {
    let protected = render_entries(&[existing_entry(1, "1-1")]);
    let stray = design_url("NEW", "9-9");
    let doc = format!("Intro\n\n## Design Specs\n\n{protected}{stray}\n\n{SECTION_SENTINEL}\n");

    let outcome = sync_once(&doc).await;

    assert_eq!(outcome.entries.len(), 1);
    assert_eq!(outcome.entries[0].entry_number, 2);
    assert!(outcome.document.contains(&protected));
    assert!(!outcome.document.contains(&format!("{stray}\n")));
    assert!(outcome.document.starts_with("Intro\n\n## Design Specs\n\n"));
    assert_eq!(outcome.document.matches("<!-- START_design_spec_1 -->").count(), 1);
}

/// Two managed headings are a fatal structural error.
#[tokio::test]
async fn duplicate_sections_are_rejected() {
    let doc = format!(
        "# Design Specs\n{}\n\n### DESIGN SPECS\n",
        design_url("AAA", "1-2")
    );
    let provider = Arc::new(MockDesignProvider::new());
    let err = setup_synchronizer(Arc::clone(&provider))
        .synchronize(&doc)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::AmbiguousSection { count: 2, .. }));
    assert_eq!(provider.version_calls(), 0);
}

/// New entries land between old entries and the sentinel; the following
/// heading's content is byte-unchanged.
#[tokio::test]
async fn insertion_point_respects_following_heading() {
    let old = render_entries(&[existing_entry(1, "1-1")]);
    let tail = "## Testing\n\nRun `cargo test` and check the [dashboard](https://ci.example/run).\n";
    let doc = format!(
        "Adds [Login]({})\n\n## Design Specs\n\n{old}{SECTION_SENTINEL}\n\n{tail}",
        design_url("LOG", "20-30")
    );

    let outcome = sync_once(&doc).await;
    let text = &outcome.document;

    assert!(text.starts_with("Adds [Login](#design-spec-2)\n\n## Design Specs\n\n"));
    assert!(text.ends_with(&format!("{SECTION_SENTINEL}\n\n{tail}")));
    let old_end = text.find("<!-- END_design_spec_1 -->").unwrap();
    let new_start = text.find("<!-- START_design_spec_2 -->").unwrap();
    let sentinel = text.find(SECTION_SENTINEL).unwrap();
    assert!(old_end < new_start && new_start < sentinel);
}

/// An open section followed by a heading gets a sentinel before that heading.
#[tokio::test]
async fn open_section_is_closed_before_next_heading() {
    let doc = format!(
        "## Design Specs\n\n{}\n\n## Notes\nkeep\n",
        design_url("AAA", "1-2")
    );

    let outcome = sync_once(&doc).await;

    assert_eq!(outcome.document.matches(SECTION_SENTINEL).count(), 1);
    assert!(outcome
        .document
        .ends_with(&format!("<!-- END_design_spec_1 -->\n\n{SECTION_SENTINEL}\n\n## Notes\nkeep\n")));

    let again = sync_once(&outcome.document).await;
    assert!(!again.changed);
}

/// An open section running to the end of the document is closed at the end.
#[tokio::test]
async fn open_section_at_end_gets_sentinel() {
    let doc = format!("## Design Specs\n{}", design_url("AAA", "1-2"));

    let outcome = sync_once(&doc).await;

    assert!(outcome.document.ends_with(&format!("{SECTION_SENTINEL}\n")));
    assert_eq!(outcome.document.matches(SECTION_SENTINEL).count(), 1);
    assert!(!outcome.document.contains("[Design Spec 1](#design-spec-1)"));
}

/// One failing lookup drops only that link.
#[tokio::test]
async fn failing_link_is_skipped() {
    let broken = design_url("BROKEN", "1-2");
    let doc = format!("{broken}\n{}\n", design_url("GOOD", "3-4"));
    let provider = Arc::new(MockDesignProvider::new().failing_object("BROKEN"));

    let outcome = setup_synchronizer(provider)
        .synchronize(&doc)
        .await
        .unwrap();

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].url, broken);
    assert_eq!(outcome.entries.len(), 1);
    assert_eq!(outcome.entries[0].entry_number, 1);
    assert_eq!(outcome.entries[0].object_id, "GOOD");
    assert!(outcome.document.starts_with(&format!("{broken}\n[Design Spec 1](#design-spec-1)\n")));
}

/// Missing previews are treated like any other lookup failure.
#[tokio::test]
async fn missing_preview_is_skipped() {
    let doc = design_url("AAA", "1-2");
    let provider = Arc::new(MockDesignProvider::new().missing_preview("AAA", "1:2"));

    let outcome = setup_synchronizer(provider)
        .synchronize(&doc)
        .await
        .unwrap();

    assert!(!outcome.changed);
    assert_eq!(outcome.document, doc);
    assert_eq!(outcome.skipped.len(), 1);
}

/// Explicit version tags are trusted without a lookup.
#[tokio::test]
async fn explicit_version_is_used() {
    let doc = "https://tool.example/design/AAA/Name?node-id=1-2&version-id=555";
    let provider = Arc::new(MockDesignProvider::new());

    let outcome = setup_synchronizer(Arc::clone(&provider))
        .synchronize(doc)
        .await
        .unwrap();

    assert_eq!(outcome.entries[0].version_tag, "555");
    assert_eq!(outcome.entries[0].version_timestamp, "2025-01-01T09:30:00Z");
    assert_eq!(provider.version_calls(), 0);
    assert_eq!(provider.preview_calls(), 1);
}

/// A catalog already holding the largest representable number refuses new
/// entries instead of wrapping around.
#[tokio::test]
async fn exhausted_numbering_aborts_the_run() {
    let old = render_entries(&[existing_entry(u32::MAX, "1-1")]);
    let doc = format!(
        "Adds [Login]({})\n\n## Design Specs\n\n{old}{SECTION_SENTINEL}\n",
        design_url("LOG", "20-30")
    );

    let result = setup_synchronizer(Arc::new(MockDesignProvider::new()))
        .synchronize(&doc)
        .await;

    assert!(matches!(
        result,
        Err(SyncError::NumberingExhausted { existing: u32::MAX })
    ));
}

/// Autolinks lose their angle brackets along with the URL.
#[tokio::test]
async fn autolink_is_replaced_whole() {
    let doc = format!("Mock: <{}>.\n", design_url("AAA", "1-2"));

    let outcome = sync_once(&doc).await;

    assert!(outcome
        .document
        .starts_with("Mock: [Design Spec 1](#design-spec-1).\n"));
    assert!(!outcome.document.contains("<[Design Spec 1]"));
}
