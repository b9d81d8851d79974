//! designsync core - Design Specs section synchronization
//!
//! Keeps a generated, append-only "Design Specs" catalog inside a
//! pull-request description:
//! - Finds design links above and inside the managed section
//! - Skips entries generated by earlier runs (protected entries)
//! - Enriches each new link with version and preview metadata
//! - Replaces the links with cross-references and appends numbered entries
//!
//! Repeated runs are idempotent: once a link is catalogued it is no longer
//! in the document, and protected entries are never rescanned.
//!
//! # Example
//!
//! ```rust,ignore
//! use designsync_core::{DocumentRef, SyncConfig, Synchronizer};
//! use std::sync::Arc;
//!
//! # async fn example(provider: Arc<dyn designsync_core::DesignProvider>,
//! #                  store: &dyn designsync_core::DocumentStore) -> Result<(), Box<dyn std::error::Error>> {
//! let sync = Synchronizer::new(provider, SyncConfig::default());
//! let reference = DocumentRef::PullRequest {
//!     owner: "acme".into(),
//!     repo: "app".into(),
//!     number: 42,
//! };
//!
//! let report = sync.run(store, &reference).await?;
//! println!("added {} entries", report.entries.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod link;
pub mod numbering;
pub mod protect;
pub mod resolver;
pub mod section;
pub mod splice;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use config::SyncConfig;
pub use engine::{scan_links, RunReport, SkippedLink, SyncOutcome, Synchronizer};
pub use error::{ProviderError, ResolveError, StoreError, SyncError, SyncResult};
pub use link::{normalize_sub_object_id, parse_design_url, DesignUrl, LinkScan};
pub use resolver::{Clock, DesignProvider, ReferenceResolver, SystemClock};
pub use section::locate_section;
pub use splice::InsertionPlan;
pub use store::DocumentStore;
pub use types::{
    DocumentRef, Enrichment, LinkFormat, LinkMatch, LinkOrigin, ResolvedEntry, SectionBounds,
    VersionInfo,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the engine
    pub use crate::{
        Clock, DesignProvider, DocumentRef, DocumentStore, ProviderError, StoreError, SyncConfig,
        SyncError, Synchronizer, VersionInfo,
    };
}
