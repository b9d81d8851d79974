//! designsync providers - HTTP and filesystem collaborators
//!
//! Implementations of the engine's seams:
//! - [`FigmaProvider`]: version and preview lookups against the Figma REST API
//! - [`GithubPullRequestStore`]: pull-request descriptions as documents
//! - [`FileDocumentStore`]: local files as documents

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod figma;
pub mod file;
pub mod github;

pub use config::{ClientError, FigmaConfig, GithubConfig};
pub use figma::FigmaProvider;
pub use file::FileDocumentStore;
pub use github::GithubPullRequestStore;
