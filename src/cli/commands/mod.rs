//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration and validates command-specific arguments
//! 2. Calls the hosting client or a publish workflow
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Commands that talk to the hosting API are async because they involve
//! network I/O. Each one builds a tokio runtime and blocks on its async
//! implementation, so dispatch itself stays synchronous.

mod collect;
mod push;
mod rate_limit;
mod repo;

pub use collect::collect;
pub use push::{push, push_file};
pub use rate_limit::rate_limit;
pub use repo::repo;

use anyhow::{Context as _, Result};

use super::args::Command;
use super::Context;
use crate::auth::EnvCredentialSource;
use crate::core::config::Config;
use crate::forge::github::GitHubClient;
use crate::forge::RepoRef;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::RateLimit => rate_limit(ctx),
        Command::Repo { action } => repo(ctx, action),
        Command::PushFile {
            repo,
            path,
            file,
            content,
            message,
            branch,
        } => push_file(
            ctx,
            &repo,
            &path,
            file.as_deref(),
            content,
            &message,
            branch,
        ),
        Command::Push {
            repo,
            dir,
            branch,
            message,
            force,
            legacy,
        } => push(ctx, &repo, &dir, branch, &message, force, legacy),
        Command::Collect { dir } => collect(ctx, &dir),
    }
}

/// Connect to the hosting API with the configured credential.
pub(crate) async fn connect(config: &Config) -> Result<GitHubClient> {
    let source = EnvCredentialSource::new(config.token_env());
    let client = GitHubClient::from_source(config.client_options(), &source)
        .await
        .with_context(|| format!("failed to connect to {}", config.api_base()))?;
    Ok(client)
}

/// Parse an `owner/name` argument.
pub(crate) fn parse_repo(value: &str) -> Result<RepoRef> {
    Ok(RepoRef::parse(value)?)
}
