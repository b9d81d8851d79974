//! Reference resolver
//!
//! Turns each [`LinkMatch`] into an [`Enrichment`] using the design
//! provider. Lookups for one batch run concurrently, but results come back
//! in input order so numbering never depends on completion order.

use crate::config::SyncConfig;
use crate::error::{ProviderError, ResolveError};
use crate::types::{Enrichment, LinkMatch, VersionInfo};
use async_trait::async_trait;
use chrono::{DateTime, Days, Local, NaiveDate, SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use moka::future::Cache;
use std::sync::Arc;

/// Source of version and preview metadata for design objects
#[async_trait]
pub trait DesignProvider: Send + Sync {
    /// Latest version of a design object
    async fn fetch_latest_version(&self, object_id: &str) -> Result<VersionInfo, ProviderError>;

    /// Temporary preview image URL for a node; `None` if the node has none
    async fn fetch_preview_asset_url(
        &self,
        object_id: &str,
        sub_object_id: &str,
    ) -> Result<Option<String>, ProviderError>;
}

/// Wall clock used for timestamps and preview expiry
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date on the collaborator's local clock
    ///
    /// Defaults to the UTC date of [`Clock::now`].
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// [`Clock`] backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Resolves one batch of links
///
/// Holds a version cache scoped to the batch: links into the same design
/// object share one latest-version lookup.
pub struct ReferenceResolver {
    provider: Arc<dyn DesignProvider>,
    clock: Arc<dyn Clock>,
    preview_validity: Days,
    max_concurrent: usize,
    versions: Cache<String, VersionInfo>,
}

impl std::fmt::Debug for ReferenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceResolver")
            .field("preview_validity", &self.preview_validity)
            .field("max_concurrent", &self.max_concurrent)
            .field("cached_versions", &self.versions.entry_count())
            .finish_non_exhaustive()
    }
}

impl ReferenceResolver {
    /// Create resolver for one run
    #[must_use]
    pub fn new(provider: Arc<dyn DesignProvider>, clock: Arc<dyn Clock>, config: &SyncConfig) -> Self {
        Self {
            provider,
            clock,
            preview_validity: Days::new(u64::from(config.preview_validity_days)),
            max_concurrent: config.max_concurrent_lookups.max(1),
            versions: Cache::new(1_024),
        }
    }

    /// Resolve every link, preserving input order
    pub async fn resolve_all(&self, links: &[LinkMatch]) -> Vec<Result<Enrichment, ResolveError>> {
        stream::iter(links)
            .map(|link| self.resolve(link))
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    /// Resolve a single link
    ///
    /// # Errors
    /// Returns [`ResolveError`] if a lookup fails or the node has no preview.
    pub async fn resolve(&self, link: &LinkMatch) -> Result<Enrichment, ResolveError> {
        let resolved_at = self.clock.now();

        let version = match &link.explicit_version_tag {
            // Trust the URL; the real creation time is not looked up
            Some(tag) => VersionInfo {
                id: tag.clone(),
                created_at: resolved_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            },
            None => self.latest_version(&link.source_object_id).await?,
        };

        let preview_asset_url = self
            .provider
            .fetch_preview_asset_url(&link.source_object_id, &link.sub_object_id)
            .await
            .map_err(|source| ResolveError::Preview {
                object_id: link.source_object_id.clone(),
                sub_object_id: link.sub_object_id.clone(),
                source,
            })?
            .ok_or_else(|| ResolveError::PreviewNotFound {
                object_id: link.source_object_id.clone(),
                sub_object_id: link.sub_object_id.clone(),
            })?;

        let resolution_date = self.clock.today();
        let preview_expires_on = resolution_date
            .checked_add_days(self.preview_validity)
            .unwrap_or(resolution_date);

        tracing::debug!(
            url = %link.url,
            version = %version.id,
            expires = %preview_expires_on,
            "resolved design link"
        );

        Ok(Enrichment {
            version,
            preview_asset_url,
            preview_expires_on,
        })
    }

    async fn latest_version(&self, object_id: &str) -> Result<VersionInfo, ResolveError> {
        let provider = Arc::clone(&self.provider);
        let key = object_id.to_string();
        self.versions
            .try_get_with(key.clone(), async move {
                provider.fetch_latest_version(&key).await
            })
            .await
            .map_err(|source| ResolveError::Version {
                object_id: object_id.to_string(),
                source,
            })
    }
}
