//! Run configuration
//!
//! Layered lowest to highest: built-in defaults, the `--config` TOML file,
//! then environment variables and flags.

use crate::args::CliArgs;
use designsync_core::{DocumentRef, SyncConfig};
use designsync_providers::{FigmaConfig, GithubConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration errors (exit code 2)
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing {0}")]
    Missing(&'static str),

    #[error("repository must be owner/name, got {0:?}")]
    InvalidRepository(String),

    #[error("{0}")]
    Invalid(String),
}

/// Contents of the `--config` file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) sync: SyncConfig,
    pub(crate) figma: FigmaConfig,
    pub(crate) github: GithubConfig,
}

impl FileConfig {
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved settings for one run
#[derive(Debug)]
pub(crate) struct AppConfig {
    pub(crate) sync: SyncConfig,
    pub(crate) figma: FigmaConfig,
    pub(crate) github: GithubConfig,
    pub(crate) target: DocumentRef,
    pub(crate) figma_token: String,
    pub(crate) github_token: Option<String>,
    pub(crate) dry_run: bool,
}

impl AppConfig {
    pub(crate) fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let mut sync = file.sync;
        if let Some(days) = args.preview_validity_days {
            sync = sync.with_preview_validity_days(days);
        }
        if let Some(max) = args.max_concurrent_lookups {
            sync = sync.with_max_concurrent_lookups(max);
        }
        validate(&sync, &file.figma)?;

        let target = match &args.file {
            Some(path) => DocumentRef::File(path.clone()),
            None => pull_request_target(args)?,
        };

        let github_token = non_empty(args.github_token.as_deref());
        if matches!(target, DocumentRef::PullRequest { .. }) && github_token.is_none() {
            return Err(ConfigError::Missing("GitHub token (--github-token or GITHUB_TOKEN)"));
        }
        let figma_token = non_empty(args.figma_token.as_deref())
            .ok_or(ConfigError::Missing("Figma token (--figma-token or FIGMA_TOKEN)"))?;

        Ok(Self {
            sync,
            figma: file.figma,
            github: file.github,
            target,
            figma_token,
            github_token,
            dry_run: args.dry_run,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn pull_request_target(args: &CliArgs) -> Result<DocumentRef, ConfigError> {
    let repository = non_empty(args.repository.as_deref())
        .ok_or(ConfigError::Missing("repository (--repository or GITHUB_REPOSITORY)"))?;
    let number = args
        .pr_number
        .ok_or(ConfigError::Missing("pull request number (--pr or PR_NUMBER)"))?;

    let (owner, repo) = repository
        .split_once('/')
        .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
        .ok_or_else(|| ConfigError::InvalidRepository(repository.clone()))?;

    Ok(DocumentRef::PullRequest {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number,
    })
}

fn validate(sync: &SyncConfig, figma: &FigmaConfig) -> Result<(), ConfigError> {
    if sync.max_concurrent_lookups == 0 {
        return Err(ConfigError::Invalid(
            "max_concurrent_lookups must be at least 1".to_string(),
        ));
    }
    if !(0.01..=4.0).contains(&figma.preview_scale) {
        return Err(ConfigError::Invalid(format!(
            "preview_scale must be between 0.01 and 4, got {}",
            figma.preview_scale
        )));
    }
    Ok(())
}
