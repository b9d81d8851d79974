//! GitHub pull-request description store
//!
//! The managed document is the `body` field of a pull request. A `null`
//! body is treated as an empty document.

use crate::config::{ClientError, GithubConfig};
use async_trait::async_trait;
use designsync_core::{DocumentRef, DocumentStore, StoreError};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct PullRequest {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    body: &'a str,
}

/// [`DocumentStore`] reading and writing pull-request descriptions
#[derive(Debug, Clone)]
pub struct GithubPullRequestStore {
    client: reqwest::Client,
    config: GithubConfig,
}

impl GithubPullRequestStore {
    /// Create store authenticating with a bearer token
    ///
    /// # Errors
    /// Returns [`ClientError`] if the token is not a valid header value or
    /// the client cannot be built.
    pub fn new(token: &str, config: GithubConfig) -> Result<Self, ClientError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ClientError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    fn pull_url(&self, reference: &DocumentRef) -> Result<String, StoreError> {
        match reference {
            DocumentRef::PullRequest {
                owner,
                repo,
                number,
            } => Ok(format!(
                "{}/repos/{owner}/{repo}/pulls/{number}",
                self.config.api_base
            )),
            DocumentRef::File(_) => Err(StoreError::UnsupportedReference(reference.to_string())),
        }
    }

    async fn send(
        request: reqwest::RequestBuilder,
        reference: &DocumentRef,
    ) -> Result<String, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(reference.to_string()));
        }
        if !status.is_success() {
            return Err(StoreError::Http {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(body)
    }
}

fn decode_body(payload: &str) -> Result<String, StoreError> {
    let pull: PullRequest =
        serde_json::from_str(payload).map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(pull.body.unwrap_or_default())
}

#[async_trait]
impl DocumentStore for GithubPullRequestStore {
    async fn fetch_document(&self, reference: &DocumentRef) -> Result<String, StoreError> {
        let url = self.pull_url(reference)?;
        tracing::debug!(%reference, "fetching pull request body");
        let payload = Self::send(self.client.get(url), reference).await?;
        decode_body(&payload)
    }

    async fn persist_document(&self, reference: &DocumentRef, text: &str) -> Result<(), StoreError> {
        let url = self.pull_url(reference)?;
        tracing::info!(%reference, bytes = text.len(), "updating pull request body");
        Self::send(
            self.client.patch(url).json(&UpdateBody { body: text }),
            reference,
        )
        .await?;
        Ok(())
    }
}
