//! designsync - Design Specs section synchronizer
//!
//! Exit codes:
//! - 0: success, including runs with nothing to do
//! - 1: runtime failure (network, store, provider)
//! - 2: configuration error
//! - 3: the document has more than one Design Specs section

mod args;
mod config;
mod logging;

use anyhow::Context;
use args::CliArgs;
use config::{AppConfig, ConfigError};
use designsync_core::prelude::*;
use designsync_providers::{FigmaProvider, FileDocumentStore, GithubPullRequestStore};
use std::process::ExitCode;
use std::sync::Arc;

const EXIT_RUNTIME: u8 = 1;
const EXIT_CONFIG: u8 = 2;
const EXIT_AMBIGUOUS: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = args::command().get_matches();
    let args = CliArgs::from_matches(&matches);

    if let Err(e) = logging::init(args.log_level.as_deref(), args.log_format) {
        eprintln!("error: {e:#}");
        return ExitCode::from(EXIT_CONFIG);
    }

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "synchronization failed");
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(args: &CliArgs) -> anyhow::Result<()> {
    let config = AppConfig::resolve(args)?;

    let provider = FigmaProvider::new(&config.figma_token, config.figma.clone())
        .context("failed to create Figma client")?;
    let synchronizer = Synchronizer::new(Arc::new(provider), config.sync.clone());

    let store: Box<dyn DocumentStore> = match (&config.target, &config.github_token) {
        (DocumentRef::PullRequest { .. }, Some(token)) => Box::new(
            GithubPullRequestStore::new(token, config.github.clone())
                .context("failed to create GitHub client")?,
        ),
        _ => Box::new(FileDocumentStore::new()),
    };

    if config.dry_run {
        let original = store
            .fetch_document(&config.target)
            .await
            .with_context(|| format!("failed to fetch {}", config.target))?;
        let outcome = synchronizer.synchronize(&original).await?;
        tracing::info!(
            entries = outcome.entries.len(),
            skipped = outcome.skipped.len(),
            changed = outcome.changed,
            "dry run, nothing persisted"
        );
        println!("{}", outcome.document);
        return Ok(());
    }

    let report = synchronizer.run(store.as_ref(), &config.target).await?;
    for skipped in &report.skipped {
        tracing::warn!(url = %skipped.url, reason = %skipped.reason, "link left in place");
    }
    tracing::info!(
        document = %report.reference,
        entries = report.entries.len(),
        skipped = report.skipped.len(),
        persisted = report.persisted,
        "done"
    );
    Ok(())
}

fn exit_code(error: &anyhow::Error) -> u8 {
    if error.downcast_ref::<ConfigError>().is_some() {
        return EXIT_CONFIG;
    }
    match error.downcast_ref::<SyncError>() {
        Some(e) if e.requires_manual_fix() => EXIT_AMBIGUOUS,
        _ => EXIT_RUNTIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_error_kind() {
        let config: anyhow::Error = ConfigError::Missing("Figma token").into();
        assert_eq!(exit_code(&config), EXIT_CONFIG);

        let ambiguous: anyhow::Error = SyncError::AmbiguousSection {
            count: 2,
            offsets: vec![0, 10],
        }
        .into();
        assert_eq!(exit_code(&ambiguous), EXIT_AMBIGUOUS);

        let store: anyhow::Error = SyncError::Store(StoreError::NotFound("acme/app#1".into())).into();
        assert_eq!(exit_code(&store), EXIT_RUNTIME);
    }

    #[test]
    fn context_keeps_error_kind() {
        let err = anyhow::Error::from(SyncError::AmbiguousSection {
            count: 3,
            offsets: vec![0, 5, 9],
        })
        .context("run failed");
        assert_eq!(exit_code(&err), EXIT_AMBIGUOUS);
    }
}
