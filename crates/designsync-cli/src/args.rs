//! Command-line definition
//!
//! Flags fall back to the environment variables CI already sets.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Parsed command line
#[derive(Debug, Clone, Default)]
pub(crate) struct CliArgs {
    pub(crate) config: Option<PathBuf>,
    pub(crate) file: Option<PathBuf>,
    pub(crate) repository: Option<String>,
    pub(crate) pr_number: Option<u64>,
    pub(crate) figma_token: Option<String>,
    pub(crate) github_token: Option<String>,
    pub(crate) preview_validity_days: Option<u32>,
    pub(crate) max_concurrent_lookups: Option<usize>,
    pub(crate) dry_run: bool,
    pub(crate) log_level: Option<String>,
    pub(crate) log_format: LogFormat,
}

pub(crate) fn command() -> Command {
    Command::new("designsync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Catalog design links in a pull request's Design Specs section")
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with sync, figma and github settings"),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .value_parser(value_parser!(PathBuf))
                .help("Synchronize a local markdown file instead of a pull request"),
        )
        .arg(
            Arg::new("repository")
                .long("repository")
                .env("GITHUB_REPOSITORY")
                .help("Repository as owner/name"),
        )
        .arg(
            Arg::new("pr")
                .long("pr")
                .env("PR_NUMBER")
                .value_parser(value_parser!(u64))
                .help("Pull request number"),
        )
        .arg(
            Arg::new("figma-token")
                .long("figma-token")
                .env("FIGMA_TOKEN")
                .hide_env_values(true)
                .help("Figma personal access token"),
        )
        .arg(
            Arg::new("github-token")
                .long("github-token")
                .env("GITHUB_TOKEN")
                .hide_env_values(true)
                .help("GitHub token with pull request write access"),
        )
        .arg(
            Arg::new("preview-validity-days")
                .long("preview-validity-days")
                .value_parser(value_parser!(u32))
                .help("Days a rendered preview URL stays valid"),
        )
        .arg(
            Arg::new("max-concurrent-lookups")
                .long("max-concurrent-lookups")
                .value_parser(value_parser!(usize))
                .help("Upper bound on in-flight provider requests"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Print the synchronized document instead of saving it"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log filter, overrides RUST_LOG (e.g. debug, designsync_core=trace)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Log output format"),
        )
}

impl CliArgs {
    pub(crate) fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config: matches.get_one::<PathBuf>("config").cloned(),
            file: matches.get_one::<PathBuf>("file").cloned(),
            repository: matches.get_one::<String>("repository").cloned(),
            pr_number: matches.get_one::<u64>("pr").copied(),
            figma_token: matches.get_one::<String>("figma-token").cloned(),
            github_token: matches.get_one::<String>("github-token").cloned(),
            preview_validity_days: matches.get_one::<u32>("preview-validity-days").copied(),
            max_concurrent_lookups: matches.get_one::<usize>("max-concurrent-lookups").copied(),
            dry_run: matches.get_flag("dry-run"),
            log_level: matches.get_one::<String>("log-level").cloned(),
            log_format: match matches.get_one::<String>("log-format").map(String::as_str) {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        }
    }
}
