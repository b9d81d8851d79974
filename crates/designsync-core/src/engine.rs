//! Synchronization engine
//!
//! Wires the components together for one document snapshot:
//!
//! ```text
//! locate_section ──┐
//!                  ├─ protected ranges ─ extract_links ─ dedupe_by_url
//! extract (above) ─┘                                        │
//!                     CatalogNumberer ◄── ReferenceResolver ◄┘
//!                           │
//!          apply_replacements → locate_section → InsertionPlan → insert_entries
//! ```

use crate::catalog::{cross_reference, render_entries};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::link::{dedupe_by_url, extract_links, LinkScan};
use crate::numbering::CatalogNumberer;
use crate::protect::{protected_ranges, unprotected_segments};
use crate::resolver::{Clock, DesignProvider, ReferenceResolver, SystemClock};
use crate::section::locate_section;
use crate::splice::{apply_replacements, insert_entries, InsertionPlan, Replacement};
use crate::store::DocumentStore;
use crate::types::{DocumentRef, LinkMatch, LinkOrigin, ResolvedEntry, SectionBounds};
use std::collections::HashMap;
use std::sync::Arc;

/// A link dropped from the batch because enrichment failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLink {
    /// Design URL left untouched in the document
    pub url: String,
    /// Why it was skipped
    pub reason: String,
}

/// Result of synchronizing one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Final document text
    pub document: String,
    /// Entries added in this run, in number order
    pub entries: Vec<ResolvedEntry>,
    /// Links that could not be resolved
    pub skipped: Vec<SkippedLink>,
    /// Whether `document` differs from the input byte-for-byte
    pub changed: bool,
}

/// Result of a fetch → synchronize → persist cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Document that was synchronized
    pub reference: DocumentRef,
    /// Entries added
    pub entries: Vec<ResolvedEntry>,
    /// Links that could not be resolved
    pub skipped: Vec<SkippedLink>,
    /// Whether the store was written
    pub persisted: bool,
}

/// Keeps the managed section of a document in sync with its design links
pub struct Synchronizer {
    provider: Arc<dyn DesignProvider>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Synchronizer {
    /// Create synchronizer using the system clock
    #[inline]
    #[must_use]
    pub fn new(provider: Arc<dyn DesignProvider>, config: SyncConfig) -> Self {
        Self::with_clock(provider, Arc::new(SystemClock), config)
    }

    /// Create synchronizer with an explicit clock
    #[inline]
    #[must_use]
    pub fn with_clock(
        provider: Arc<dyn DesignProvider>,
        clock: Arc<dyn Clock>,
        config: SyncConfig,
    ) -> Self {
        Self {
            provider,
            clock,
            config,
        }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Fetch, synchronize and persist one document
    ///
    /// The store is written only when the computed text differs from the
    /// fetched text.
    ///
    /// # Errors
    /// Returns [`SyncError`] on store failures or an ambiguous section. No
    /// write happens in either case.
    pub async fn run(
        &self,
        store: &dyn DocumentStore,
        reference: &DocumentRef,
    ) -> Result<RunReport, SyncError> {
        tracing::info!(document = %reference, "synchronizing design specs");

        let original = store.fetch_document(reference).await?;
        let outcome = self.synchronize(&original).await?;

        if outcome.changed {
            store.persist_document(reference, &outcome.document).await?;
            tracing::info!(
                document = %reference,
                added = outcome.entries.len(),
                skipped = outcome.skipped.len(),
                "document updated"
            );
        } else {
            tracing::info!(document = %reference, "document unchanged; skipping write");
        }

        Ok(RunReport {
            reference: reference.clone(),
            entries: outcome.entries,
            skipped: outcome.skipped,
            persisted: outcome.changed,
        })
    }

    /// Compute the synchronized form of `document`
    ///
    /// # Errors
    /// Returns [`SyncError::AmbiguousSection`] if the document has more than
    /// one managed heading.
    pub async fn synchronize(&self, document: &str) -> Result<SyncOutcome, SyncError> {
        let bounds = locate_section(document)?;
        let section_text = bounds
            .body(document.len())
            .map_or("", |body| &document[body]);

        let scan = scan_links(document, &bounds);
        if scan.is_empty() {
            tracing::debug!("no design links found");
            return Ok(unchanged(document));
        }
        tracing::debug!(
            links = scan.matches.len(),
            duplicates = scan.duplicates.len(),
            "design links found"
        );

        let resolver =
            ReferenceResolver::new(Arc::clone(&self.provider), Arc::clone(&self.clock), &self.config);
        let results = resolver.resolve_all(&scan.matches).await;

        // Numbers follow discovery order over the successful subset
        let mut numberer = CatalogNumberer::from_section(section_text);
        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        for (link, result) in scan.matches.iter().zip(results) {
            match result {
                Ok(enrichment) => {
                    entries.push(ResolvedEntry::new(numberer.next_number()?, link, enrichment));
                }
                Err(err) => {
                    tracing::warn!(url = %link.url, error = %err, "skipping design link");
                    skipped.push(SkippedLink {
                        url: link.url.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        if entries.is_empty() {
            return Ok(SyncOutcome {
                skipped,
                ..unchanged(document)
            });
        }

        let numbers: HashMap<&str, u32> = entries
            .iter()
            .map(|e| (e.source_url.as_str(), e.entry_number))
            .collect();
        let replacements = scan
            .occurrences()
            .filter_map(|link| {
                numbers
                    .get(link.url.as_str())
                    .map(|&number| replacement_for(link, number))
            })
            .collect();

        let replaced = apply_replacements(document.to_string(), replacements)?;
        let plan = InsertionPlan::decide(&locate_section(&replaced)?);
        tracing::debug!(?plan, entries = entries.len(), "inserting catalog entries");
        let updated = insert_entries(replaced, plan, &render_entries(&entries));

        Ok(SyncOutcome {
            changed: updated != document,
            document: updated,
            entries,
            skipped,
        })
    }
}

/// Find every design link the engine may act on
///
/// Scans the text above the managed section and the unprotected parts of
/// its body. Text after the section end is never scanned. `bounds` must
/// come from the same snapshot.
#[must_use]
pub fn scan_links(document: &str, bounds: &SectionBounds) -> LinkScan {
    let above = bounds.above(document.len());
    let mut found = extract_links(&document[above.clone()], above.start, LinkOrigin::AboveSection);

    if let Some(body) = bounds.body(document.len()) {
        let protected: Vec<_> = protected_ranges(&document[body.clone()])
            .into_iter()
            .map(|r| r.start + body.start..r.end + body.start)
            .collect();
        for segment in unprotected_segments(body, &protected) {
            found.extend(extract_links(
                &document[segment.clone()],
                segment.start,
                LinkOrigin::WithinSectionUnprotected,
            ));
        }
    }

    dedupe_by_url(found)
}

fn replacement_for(link: &LinkMatch, entry_number: u32) -> Replacement {
    let text = match link.origin {
        LinkOrigin::AboveSection => cross_reference(&link.format, entry_number),
        LinkOrigin::WithinSectionUnprotected => String::new(),
    };
    Replacement {
        offset: link.document_offset,
        original: link.raw_text.clone(),
        text,
    }
}

fn unchanged(document: &str) -> SyncOutcome {
    SyncOutcome {
        document: document.to_string(),
        entries: Vec::new(),
        skipped: Vec::new(),
        changed: false,
    }
}
