//! publish::legacy
//!
//! Per-file publishing through the contents endpoint.
//!
//! Each file becomes its own commit. A failure on one file is recorded and
//! the batch moves on, so the result is a [`BatchPushReport`] rather than a
//! single `Result`. Prefer [`commit_changes`](super::commit_changes) for new
//! callers.

use tracing::{debug, warn};

use super::FileChange;
use crate::forge::{BlobEncoding, CommitSummary, ForgeError, HostingApi, PutFileRequest, RepoRef};

/// Settings for [`push_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPushOptions {
    pub branch: String,
    /// Message for every commit; `None` uses `Update <path>`
    pub message: Option<String>,
    /// Look up existing file hashes so files are updated rather than
    /// rejected as already present
    pub update_existing: bool,
}

impl BatchPushOptions {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            message: None,
            update_existing: true,
        }
    }

    fn message_for(&self, path: &str) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("Update {}", path))
    }
}

/// A file the batch could not push.
#[derive(Debug, Clone)]
pub struct PushFailure {
    pub path: String,
    pub error: ForgeError,
}

/// Outcome of a legacy batch push.
#[derive(Debug, Clone, Default)]
pub struct BatchPushReport {
    /// Pushed files with the commit each produced, in input order
    pub pushed: Vec<(String, CommitSummary)>,
    /// Files that failed, in input order
    pub failed: Vec<PushFailure>,
    /// Number of files submitted
    pub total: usize,
}

impl BatchPushReport {
    /// True when every submitted file was pushed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.pushed.len() == self.total
    }

    /// Commit produced by the last successful push.
    pub fn last_commit(&self) -> Option<&CommitSummary> {
        self.pushed.last().map(|(_, summary)| summary)
    }
}

/// Push files one at a time, continuing past failures.
///
/// When `update_existing` is set, each file's current hash is looked up
/// first; a failed lookup is treated as "file absent".
pub async fn push_files(
    host: &dyn HostingApi,
    repo: &RepoRef,
    files: &[FileChange],
    options: &BatchPushOptions,
) -> BatchPushReport {
    let mut report = BatchPushReport {
        total: files.len(),
        ..BatchPushReport::default()
    };

    for file in files {
        match push_one(host, repo, file, options).await {
            Ok(summary) => {
                debug!(repo = %repo, path = %file.path, commit = %summary.sha.short(), "pushed file");
                report.pushed.push((file.path.clone(), summary));
            }
            Err(error) => {
                warn!(repo = %repo, path = %file.path, error = %error, "failed to push file");
                report.failed.push(PushFailure {
                    path: file.path.clone(),
                    error,
                });
            }
        }
    }

    report
}

async fn push_one(
    host: &dyn HostingApi,
    repo: &RepoRef,
    file: &FileChange,
    options: &BatchPushOptions,
) -> Result<CommitSummary, ForgeError> {
    file.validate()?;
    if file.encoding == BlobEncoding::Base64 {
        return Err(ForgeError::InvalidInput(format!(
            "'{}' is binary; use the atomic commit workflow",
            file.path
        )));
    }

    let existing_sha = if options.update_existing {
        match host.get_file_sha(repo, &file.path, &options.branch).await {
            Ok(sha) => sha,
            Err(e) => {
                debug!(path = %file.path, error = %e, "hash lookup failed, treating file as new");
                None
            }
        }
    } else {
        None
    };

    host.push_single_file(PutFileRequest {
        repo: repo.clone(),
        path: file.path.clone(),
        content: file.content.clone(),
        message: options.message_for(&file.path),
        branch: options.branch.clone(),
        existing_sha,
    })
    .await
}

/// Create or update one file, producing one commit.
///
/// Unlike [`push_files`], a failed hash lookup is an error.
pub async fn upsert_file(
    host: &dyn HostingApi,
    repo: &RepoRef,
    branch: &str,
    file: &FileChange,
    message: &str,
) -> Result<CommitSummary, ForgeError> {
    file.validate()?;
    let existing_sha = host.get_file_sha(repo, &file.path, branch).await?;

    host.push_single_file(PutFileRequest {
        repo: repo.clone(),
        path: file.path.clone(),
        content: file.content.clone(),
        message: message.to_string(),
        branch: branch.to_string(),
        existing_sha,
    })
    .await
}
