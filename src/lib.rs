//! ghpublish - publish generated project files to GitHub
//!
//! ghpublish wraps the GitHub REST API for repository management and
//! publishes a set of files to a branch as a single atomic commit.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to handlers)
//! - [`forge`] - Hosting API seam, the GitHub client, and an in-memory host
//! - [`publish`] - Atomic commit workflow and the legacy per-file push
//! - [`collect`] - Local project file enumeration
//! - [`auth`] - Credential sources
//! - [`core`] - Configuration
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. A branch moves only after its new commit exists
//! 2. Every new commit has exactly one parent: the branch tip read at start
//! 3. A branch is never moved backwards or sideways unless forced
//!
//! # Example
//!
//! ```no_run
//! use ghpublish::auth::EnvCredentialSource;
//! use ghpublish::forge::github::{ClientOptions, GitHubClient};
//! use ghpublish::forge::RepoRef;
//! use ghpublish::publish::{commit_changes, CommitOptions, CommitRequest, FileChange};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client =
//!     GitHubClient::from_source(ClientOptions::default(), &EnvCredentialSource::default()).await?;
//! let request = CommitRequest::new(
//!     RepoRef::new("octocat", "demo"),
//!     "main",
//!     "Add files",
//!     vec![FileChange::text("a.txt", "A"), FileChange::text("b.txt", "B")],
//! );
//! let outcome = commit_changes(&client, &request, &CommitOptions::default()).await?;
//! println!("{}", outcome.commit);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod collect;
pub mod core;
pub mod forge;
pub mod publish;
pub mod ui;
