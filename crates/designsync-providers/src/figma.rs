//! Figma REST provider
//!
//! - `GET /v1/files/{key}/versions`: newest version first
//! - `GET /v1/images/{key}?ids={node}`: temporary render URLs, `null` when
//!   the node cannot be rendered

use crate::config::{ClientError, FigmaConfig};
use async_trait::async_trait;
use designsync_core::{DesignProvider, ProviderError, VersionInfo};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct VersionsResponse {
    #[serde(default)]
    versions: Vec<VersionRecord>,
}

#[derive(Debug, Deserialize)]
struct VersionRecord {
    id: String,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    err: Option<String>,
    #[serde(default)]
    images: HashMap<String, Option<String>>,
}

/// [`DesignProvider`] backed by the Figma REST API
#[derive(Debug, Clone)]
pub struct FigmaProvider {
    client: reqwest::Client,
    config: FigmaConfig,
}

impl FigmaProvider {
    /// Create provider authenticating with a personal access token
    ///
    /// # Errors
    /// Returns [`ClientError`] if the token is not a valid header value or
    /// the client cannot be built.
    pub fn new(token: &str, config: FigmaConfig) -> Result<Self, ClientError> {
        let mut token = HeaderValue::from_str(token).map_err(|_| ClientError::InvalidToken)?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert("X-Figma-Token", token);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FigmaConfig {
        &self.config
    }

    fn versions_request(&self, object_id: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/v1/files/{object_id}/versions", self.config.api_base))
    }

    fn images_request(&self, object_id: &str, sub_object_id: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/v1/images/{object_id}", self.config.api_base))
            .query(&[
                ("ids", sub_object_id.to_string()),
                ("format", self.config.preview_format.clone()),
                ("scale", self.config.preview_scale.to_string()),
            ])
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<String, ProviderError> {
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(body)
    }
}

fn latest_version(object_id: &str, body: &str) -> Result<VersionInfo, ProviderError> {
    let response: VersionsResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;
    response
        .versions
        .into_iter()
        .next()
        .map(|v| VersionInfo {
            id: v.id,
            created_at: v.created_at,
        })
        .ok_or_else(|| ProviderError::NoVersions(object_id.to_string()))
}

fn preview_url(sub_object_id: &str, body: &str) -> Result<Option<String>, ProviderError> {
    let response: ImagesResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;
    if let Some(err) = response.err {
        return Err(ProviderError::Decode(err));
    }
    Ok(response.images.get(sub_object_id).cloned().flatten())
}

#[async_trait]
impl DesignProvider for FigmaProvider {
    async fn fetch_latest_version(&self, object_id: &str) -> Result<VersionInfo, ProviderError> {
        tracing::debug!(object_id, "fetching latest version");
        let body = Self::send(self.versions_request(object_id)).await?;
        latest_version(object_id, &body)
    }

    async fn fetch_preview_asset_url(
        &self,
        object_id: &str,
        sub_object_id: &str,
    ) -> Result<Option<String>, ProviderError> {
        tracing::debug!(object_id, sub_object_id, "fetching preview");
        let body = Self::send(self.images_request(object_id, sub_object_id)).await?;
        preview_url(sub_object_id, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> FigmaProvider {
        FigmaProvider::new("figd_test", FigmaConfig::default()).unwrap()
    }

    #[test]
    fn decodes_newest_version() {
        let body = r#"{"versions":[
            {"id":"2","created_at":"2025-02-01T10:00:00Z","label":null,"description":null},
            {"id":"1","created_at":"2025-01-01T10:00:00Z","label":"init","description":""}
        ],"pagination":{}}"#;
        let version = latest_version("KEY", body).unwrap();
        assert_eq!(version.id, "2");
        assert_eq!(version.created_at, "2025-02-01T10:00:00Z");
    }

    #[test]
    fn empty_history_is_an_error() {
        let err = latest_version("KEY", r#"{"versions":[]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::NoVersions(key) if key == "KEY"));
    }

    #[test]
    fn decodes_preview_url() {
        let body = r#"{"err":null,"images":{"1:2":"https://s3.example/render.png"}}"#;
        assert_eq!(
            preview_url("1:2", body).unwrap().as_deref(),
            Some("https://s3.example/render.png")
        );
    }

    #[test]
    fn null_preview_is_not_found() {
        let body = r#"{"err":null,"images":{"1:2":null}}"#;
        assert_eq!(preview_url("1:2", body).unwrap(), None);
        assert_eq!(preview_url("9:9", body).unwrap(), None);
    }

    #[test]
    fn api_error_is_reported() {
        let body = r#"{"err":"Invalid scale","images":{}}"#;
        assert!(matches!(preview_url("1:2", body), Err(ProviderError::Decode(_))));
    }

    #[test]
    fn requests_target_api_paths() {
        let provider = provider();

        let versions = provider.versions_request("KEY").build().unwrap();
        assert_eq!(versions.url().as_str(), "https://api.figma.com/v1/files/KEY/versions");

        let images = provider.images_request("KEY", "1:2").build().unwrap();
        assert_eq!(images.url().path(), "/v1/images/KEY");
        let query = images.url().query().unwrap();
        assert!(query.contains("ids=1%3A2"));
        assert!(query.contains("format=png"));
        assert!(query.contains("scale=2"));
    }

    #[test]
    fn rejects_header_breaking_token() {
        let err = FigmaProvider::new("bad\ntoken", FigmaConfig::default()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidToken));
    }
}
