//! Testing utilities for designsync workspace
//!
//! Shared test helpers, fixtures, and collaborator fakes.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use designsync_core::{
    Clock, DesignProvider, DocumentRef, DocumentStore, ProviderError, StoreError, SyncConfig,
    Synchronizer, VersionInfo,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const VERSION_ID: &str = "V1";
pub const VERSION_CREATED_AT: &str = "2025-01-01T00:00:00Z";
pub const PREVIEW_URL: &str = "https://img.example/p.png";

/// Design URL on the example host
pub fn design_url(object_id: &str, node: &str) -> String {
    format!("https://tool.example/design/{object_id}/Name?node-id={node}")
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32) -> Self {
        Self(Utc.with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap())
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(2025, 1, 1)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Scripted design provider
///
/// Answers every object with `V1` and every node with [`PREVIEW_URL`]
/// unless told otherwise.
#[derive(Debug, Default)]
pub struct MockDesignProvider {
    versions: HashMap<String, VersionInfo>,
    previews: HashMap<(String, String), String>,
    failing_objects: HashSet<String>,
    missing_previews: HashSet<(String, String)>,
    version_calls: AtomicUsize,
    preview_calls: AtomicUsize,
}

impl MockDesignProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, object_id: &str, id: &str, created_at: &str) -> Self {
        self.versions.insert(
            object_id.to_string(),
            VersionInfo {
                id: id.to_string(),
                created_at: created_at.to_string(),
            },
        );
        self
    }

    pub fn with_preview(mut self, object_id: &str, sub_object_id: &str, url: &str) -> Self {
        self.previews.insert(
            (object_id.to_string(), sub_object_id.to_string()),
            url.to_string(),
        );
        self
    }

    pub fn failing_object(mut self, object_id: &str) -> Self {
        self.failing_objects.insert(object_id.to_string());
        self
    }

    pub fn missing_preview(mut self, object_id: &str, sub_object_id: &str) -> Self {
        self.missing_previews
            .insert((object_id.to_string(), sub_object_id.to_string()));
        self
    }

    pub fn version_calls(&self) -> usize {
        self.version_calls.load(Ordering::SeqCst)
    }

    pub fn preview_calls(&self) -> usize {
        self.preview_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DesignProvider for MockDesignProvider {
    async fn fetch_latest_version(&self, object_id: &str) -> Result<VersionInfo, ProviderError> {
        self.version_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_objects.contains(object_id) {
            return Err(ProviderError::Http {
                status: 500,
                message: format!("scripted failure for {object_id}"),
            });
        }
        Ok(self
            .versions
            .get(object_id)
            .cloned()
            .unwrap_or_else(|| VersionInfo {
                id: VERSION_ID.to_string(),
                created_at: VERSION_CREATED_AT.to_string(),
            }))
    }

    async fn fetch_preview_asset_url(
        &self,
        object_id: &str,
        sub_object_id: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.preview_calls.fetch_add(1, Ordering::SeqCst);
        let key = (object_id.to_string(), sub_object_id.to_string());
        if self.missing_previews.contains(&key) {
            return Ok(None);
        }
        Ok(Some(
            self.previews
                .get(&key)
                .cloned()
                .unwrap_or_else(|| PREVIEW_URL.to_string()),
        ))
    }
}

/// Document store backed by a map, recording every write
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: Mutex<HashMap<DocumentRef, String>>,
    writes: Mutex<Vec<(DocumentRef, String)>>,
}

impl InMemoryStore {
    pub fn with_document(reference: &DocumentRef, text: &str) -> Self {
        let mut documents = HashMap::new();
        documents.insert(reference.clone(), text.to_string());
        Self {
            documents: Mutex::new(documents),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub async fn current(&self, reference: &DocumentRef) -> Option<String> {
        self.documents.lock().await.get(reference).cloned()
    }

    pub async fn write_count(&self) -> usize {
        self.writes.lock().await.len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn fetch_document(&self, reference: &DocumentRef) -> Result<String, StoreError> {
        self.documents
            .lock()
            .await
            .get(reference)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))
    }

    async fn persist_document(&self, reference: &DocumentRef, text: &str) -> Result<(), StoreError> {
        self.documents
            .lock()
            .await
            .insert(reference.clone(), text.to_string());
        self.writes
            .lock()
            .await
            .push((reference.clone(), text.to_string()));
        Ok(())
    }
}

pub fn pull_request(number: u64) -> DocumentRef {
    DocumentRef::PullRequest {
        owner: "acme".to_string(),
        repo: "app".to_string(),
        number,
    }
}

pub fn setup_synchronizer(provider: Arc<MockDesignProvider>) -> Synchronizer {
    Synchronizer::with_clock(provider, Arc::new(FixedClock::default()), SyncConfig::default())
}
