//! Adapter configuration
//!
//! Tokens are not part of these structs; they are passed to the
//! constructors.

use serde::{Deserialize, Serialize};

/// Figma REST API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigmaConfig {
    /// API root, without trailing slash
    pub api_base: String,
    /// Image format requested for previews (`png`, `jpg`, `svg`, `pdf`)
    pub preview_format: String,
    /// Image scale between 0.01 and 4
    pub preview_scale: f32,
    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for FigmaConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.figma.com".to_string(),
            preview_format: "png".to_string(),
            preview_scale: 2.0,
            request_timeout_secs: 30,
        }
    }
}

/// GitHub REST API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// API root, without trailing slash
    pub api_base: String,
    /// `User-Agent` header (GitHub rejects requests without one)
    pub user_agent: String,
    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            user_agent: concat!("designsync/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Errors building an HTTP adapter
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Token contains characters not allowed in a header
    #[error("token is not a valid header value")]
    InvalidToken,

    /// reqwest could not build the client
    #[error("http client error: {0}")]
    Build(#[from] reqwest::Error),
}
