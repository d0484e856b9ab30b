//! push and push-file commands - Publish files to a repository
//!
//! # Example
//!
//! ```bash
//! # One commit with every collected file
//! ghpub push octocat/demo --dir ./generated
//!
//! # One commit per file
//! ghpub push octocat/demo --legacy
//!
//! # A single file
//! ghpub push-file octocat/demo VERSION --content 1.2.0 -m "Bump version"
//! ```

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use serde_json::json;

use super::{connect, parse_repo};
use crate::cli::Context;
use crate::collect::collect_project_files;
use crate::core::config::Config;
use crate::forge::github::GitHubClient;
use crate::forge::RepoRef;
use crate::publish::{
    commit_changes, push_files, upsert_file, BatchPushOptions, CommitRequest, FileChange,
};

/// Run the push command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn push(
    ctx: &Context,
    repo: &str,
    dir: &Path,
    branch: Option<String>,
    message: &str,
    force: bool,
    legacy: bool,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(push_async(ctx, repo, dir, branch, message, force, legacy))
}

async fn push_async(
    ctx: &Context,
    repo: &str,
    dir: &Path,
    branch: Option<String>,
    message: &str,
    force: bool,
    legacy: bool,
) -> Result<()> {
    let repo = parse_repo(repo)?;
    let config = ctx.load_config()?;
    let branch = branch.unwrap_or_else(|| config.default_branch().to_string());

    let files = collect_project_files(dir, &config.collect_options())
        .with_context(|| format!("failed to collect files from {}", dir.display()))?;
    if files.is_empty() {
        bail!("no files to publish under {}", dir.display());
    }
    ctx.out
        .debug(format!("collected {} file(s) from {}", files.len(), dir.display()));

    let client = connect(&config).await?;

    if legacy {
        push_legacy(ctx, &client, &repo, &branch, message, &files).await
    } else {
        push_atomic(ctx, &config, &client, repo, branch, message, force, files).await
    }
}

#[allow(clippy::too_many_arguments)]
async fn push_atomic(
    ctx: &Context,
    config: &Config,
    client: &GitHubClient,
    repo: RepoRef,
    branch: String,
    message: &str,
    force: bool,
    files: Vec<FileChange>,
) -> Result<()> {
    let request = CommitRequest {
        force,
        ..CommitRequest::new(repo, branch, message, files)
    };
    let outcome = commit_changes(client, &request, &config.commit_options())
        .await
        .with_context(|| format!("failed to publish to {}:{}", request.repo, request.branch))?;

    let web_base = config.web_base();
    let value = json!({
        "repository": outcome.repo.full_name(),
        "branch": outcome.branch,
        "commit": outcome.commit,
        "parent": outcome.parent,
        "tree": outcome.tree,
        "files": outcome.files,
        "commit_url": outcome.commit_url(&web_base),
        "repository_url": outcome.repository_url(&web_base),
    });
    ctx.out.result(&value, |_| {
        vec![
            format!(
                "Committed {} file(s) to {}:{} as {}",
                outcome.files.len(),
                outcome.repo,
                outcome.branch,
                outcome.commit.short()
            ),
            outcome.commit_url(&web_base),
        ]
    })?;
    Ok(())
}

async fn push_legacy(
    ctx: &Context,
    client: &GitHubClient,
    repo: &RepoRef,
    branch: &str,
    message: &str,
    files: &[FileChange],
) -> Result<()> {
    let options = BatchPushOptions {
        message: Some(message.to_string()),
        ..BatchPushOptions::new(branch)
    };
    let report = push_files(client, repo, files, &options).await;

    let pushed: Vec<_> = report
        .pushed
        .iter()
        .map(|(path, summary)| json!({ "path": path, "commit": summary.sha }))
        .collect();
    let failed: Vec<_> = report
        .failed
        .iter()
        .map(|f| json!({ "path": f.path, "error": f.error.to_string() }))
        .collect();
    let value = json!({
        "repository": repo.full_name(),
        "branch": branch,
        "total": report.total,
        "pushed": pushed,
        "failed": failed,
    });
    ctx.out.result(&value, |_| {
        vec![format!(
            "Pushed {} of {} file(s) to {}:{}",
            report.pushed.len(),
            report.total,
            repo,
            branch
        )]
    })?;
    for failure in &report.failed {
        ctx.out.warn(format!("{}: {}", failure.path, failure.error));
    }

    if !report.is_complete() {
        bail!(
            "{} of {} file(s) failed to push",
            report.failed.len(),
            report.total
        );
    }
    Ok(())
}

/// Run the push-file command.
pub fn push_file(
    ctx: &Context,
    repo: &str,
    path: &str,
    file: Option<&Path>,
    content: Option<String>,
    message: &str,
    branch: Option<String>,
) -> Result<()> {
    let content = match (file, content) {
        (Some(local), _) => std::fs::read_to_string(local)
            .with_context(|| format!("failed to read {}", local.display()))?,
        (None, Some(content)) => content,
        (None, None) => bail!("either --file or --content is required"),
    };
    let change = FileChange::text(path, content);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(push_file_async(ctx, repo, change, message, branch))
}

async fn push_file_async(
    ctx: &Context,
    repo: &str,
    change: FileChange,
    message: &str,
    branch: Option<String>,
) -> Result<()> {
    let repo = parse_repo(repo)?;
    let config = ctx.load_config()?;
    let branch = branch.unwrap_or_else(|| config.default_branch().to_string());
    let client = connect(&config).await?;

    let summary = upsert_file(&client, &repo, &branch, &change, message)
        .await
        .with_context(|| format!("failed to push {} to {}:{}", change.path, repo, branch))?;

    ctx.out.result(&summary, |summary| {
        vec![
            format!("Pushed {} as {}", change.path, summary.sha.short()),
            summary.html_url.clone(),
        ]
    })?;
    Ok(())
}
