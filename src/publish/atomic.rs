//! publish::atomic
//!
//! Publish a batch of files as a single commit.
//!
//! # Protocol
//!
//! 1. Resolve the branch tip (commit and base tree)
//! 2. Create one blob per file, a bounded number in flight
//! 3. Create a tree from the base tree plus one entry per distinct path
//! 4. Create a commit with exactly one parent, the tip from step 1
//! 5. Move the branch ref to the new commit
//!
//! Each step consumes the previous step's output. A failure in steps 1-4
//! returns before the ref is touched, leaving at most unreferenced objects
//! behind. A rejected ref update leaves an orphaned commit and surfaces as
//! `ForgeError::Conflict`; re-running the whole workflow is up to the caller.

use std::collections::HashMap;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::info;

use super::FileChange;
use crate::forge::{ForgeError, HostingApi, NewCommit, ObjectId, RepoRef, TreeEntry};

/// Default number of blob uploads in flight.
pub const DEFAULT_BLOB_CONCURRENCY: usize = 4;

/// What to commit, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub repo: RepoRef,
    pub branch: String,
    pub files: Vec<FileChange>,
    pub message: String,
    /// Allow a non-fast-forward ref update
    pub force: bool,
}

impl CommitRequest {
    pub fn new(
        repo: RepoRef,
        branch: impl Into<String>,
        message: impl Into<String>,
        files: Vec<FileChange>,
    ) -> Self {
        Self {
            repo,
            branch: branch.into(),
            files,
            message: message.into(),
            force: false,
        }
    }
}

/// Tuning for [`commit_changes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOptions {
    /// Maximum concurrent blob uploads (at least 1)
    pub blob_concurrency: usize,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            blob_concurrency: DEFAULT_BLOB_CONCURRENCY,
        }
    }
}

impl CommitOptions {
    fn effective_concurrency(&self) -> usize {
        self.blob_concurrency.max(1)
    }
}

/// Result of a successful atomic commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub repo: RepoRef,
    pub branch: String,
    /// The new commit the branch now points at
    pub commit: ObjectId,
    /// Tree of the new commit
    pub tree: ObjectId,
    /// The branch tip the commit was built on
    pub parent: ObjectId,
    /// Distinct paths written, in first-appearance order
    pub files: Vec<String>,
}

impl CommitOutcome {
    /// Web URL of the repository under `web_base` (e.g. `https://github.com`).
    pub fn repository_url(&self, web_base: &str) -> String {
        format!("{}/{}", web_base.trim_end_matches('/'), self.repo)
    }

    /// Web URL of the new commit.
    pub fn commit_url(&self, web_base: &str) -> String {
        format!("{}/commit/{}", self.repository_url(web_base), self.commit)
    }
}

/// Publish `request.files` to `request.branch` as one commit.
///
/// # Errors
///
/// - `InvalidInput` if there are no files or a path is malformed (no
///   request is sent)
/// - `NotFound` if the repository or branch does not exist
/// - `Conflict` if the branch moved since step 1 and `force` is off
/// - Any error of the underlying calls, unchanged
///
/// # Example
///
/// ```
/// use ghpublish::forge::mock::MockHost;
/// use ghpublish::publish::{commit_changes, CommitOptions, CommitRequest, FileChange};
///
/// # tokio_test::block_on(async {
/// let host = MockHost::new();
/// let repo = host.seed_repository("octocat/demo", &[("a.txt", "old")]);
///
/// let request = CommitRequest::new(
///     repo.clone(),
///     "main",
///     "Publish files",
///     vec![FileChange::text("a.txt", "new"), FileChange::text("b.txt", "x")],
/// );
/// let outcome = commit_changes(&host, &request, &CommitOptions::default()).await.unwrap();
///
/// assert_eq!(host.branch_head(&repo, "main"), Some(outcome.commit));
/// assert_eq!(host.read_file(&repo, "main", "a.txt").as_deref(), Some("new"));
/// # });
/// ```
pub async fn commit_changes(
    host: &dyn HostingApi,
    request: &CommitRequest,
    options: &CommitOptions,
) -> Result<CommitOutcome, ForgeError> {
    validate(request)?;
    let repo = &request.repo;

    let tip = host.get_branch_tip(repo, &request.branch).await?;
    info!(
        repo = %repo,
        branch = %request.branch,
        commit = %tip.commit.short(),
        tree = %tip.tree.short(),
        "resolved branch tip"
    );

    let blobs = create_blobs(host, repo, &request.files, options.effective_concurrency()).await?;
    info!(repo = %repo, count = blobs.len(), "created blobs");

    let entries = tree_entries(&request.files, blobs);
    let tree = host.create_tree(repo, &tip.tree, &entries).await?;
    info!(repo = %repo, tree = %tree.short(), entries = entries.len(), "created tree");

    let commit = host
        .create_commit(
            repo,
            NewCommit {
                message: request.message.clone(),
                tree: tree.clone(),
                parent: tip.commit.clone(),
            },
        )
        .await?;
    info!(
        repo = %repo,
        commit = %commit.short(),
        parent = %tip.commit.short(),
        "created commit"
    );

    host.update_ref(repo, &request.branch, &commit, request.force)
        .await?;
    info!(
        repo = %repo,
        branch = %request.branch,
        commit = %commit.short(),
        forced = request.force,
        "updated branch ref"
    );

    Ok(CommitOutcome {
        repo: repo.clone(),
        branch: request.branch.clone(),
        commit,
        tree,
        parent: tip.commit,
        files: entries.into_iter().map(|entry| entry.path).collect(),
    })
}

fn validate(request: &CommitRequest) -> Result<(), ForgeError> {
    if request.files.is_empty() {
        return Err(ForgeError::InvalidInput("no files to commit".into()));
    }
    if request.branch.trim().is_empty() {
        return Err(ForgeError::InvalidInput("branch name is empty".into()));
    }
    request.files.iter().try_for_each(FileChange::validate)
}

/// Upload one blob per file, keeping input order.
///
/// Stops at the first failure; uploads still in flight are dropped.
async fn create_blobs(
    host: &dyn HostingApi,
    repo: &RepoRef,
    files: &[FileChange],
    concurrency: usize,
) -> Result<Vec<ObjectId>, ForgeError> {
    stream::iter(files)
        .map(|file| host.create_blob(repo, &file.content, file.encoding))
        .buffered(concurrency)
        .try_collect()
        .await
}

/// Pair files with their blobs, one entry per distinct path.
///
/// A repeated path keeps the position of its first appearance and the blob
/// of its last.
fn tree_entries(files: &[FileChange], blobs: Vec<ObjectId>) -> Vec<TreeEntry> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<TreeEntry> = Vec::with_capacity(files.len());

    for (file, sha) in files.iter().zip(blobs) {
        match positions.get(file.path.as_str()) {
            Some(&index) => entries[index].sha = sha,
            None => {
                positions.insert(&file.path, entries.len());
                entries.push(TreeEntry::blob(file.path.clone(), sha));
            }
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{FailOn, MockHost, MockOperation};
    use crate::forge::BlobEncoding;

    fn oid(n: u8) -> ObjectId {
        ObjectId::new(format!("{:040x}", n)).unwrap()
    }

    mod tree_entries {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn distinct_paths_keep_order() {
            let files = vec![FileChange::text("b", "1"), FileChange::text("a", "2")];
            let entries = tree_entries(&files, vec![oid(1), oid(2)]);
            let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
            assert_eq!(paths, vec!["b", "a"]);
            assert_eq!(entries[1].sha, oid(2));
        }

        #[test]
        fn last_write_wins_at_first_position() {
            let files = vec![
                FileChange::text("a", "1"),
                FileChange::text("b", "2"),
                FileChange::text("a", "3"),
            ];
            let entries = tree_entries(&files, vec![oid(1), oid(2), oid(3)]);
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].path, "a");
            assert_eq!(entries[0].sha, oid(3));
            assert_eq!(entries[1].sha, oid(2));
        }

        proptest! {
            #[test]
            fn one_entry_per_distinct_path(paths in prop::collection::vec("[a-d]", 1..12)) {
                let files: Vec<FileChange> = paths.iter().map(|p| FileChange::text(p.clone(), "")).collect();
                let blobs: Vec<ObjectId> = (0..files.len()).map(|i| oid(i as u8)).collect();
                let entries = tree_entries(&files, blobs);

                let mut distinct = paths.clone();
                distinct.sort();
                distinct.dedup();
                prop_assert_eq!(entries.len(), distinct.len());

                for entry in &entries {
                    let last = paths.iter().rposition(|p| p == &entry.path).unwrap();
                    prop_assert_eq!(&entry.sha, &oid(last as u8));
                }
            }
        }
    }

    mod commit_changes {
        use super::*;

        fn request(repo: &RepoRef, files: Vec<FileChange>) -> CommitRequest {
            CommitRequest::new(repo.clone(), "main", "Publish", files)
        }

        #[tokio::test]
        async fn runs_steps_in_order() {
            let host = MockHost::new();
            let repo = host.seed_repository("octocat/demo", &[("a.txt", "old")]);

            commit_changes(
                &host,
                &request(&repo, vec![FileChange::text("a.txt", "new")]),
                &CommitOptions::default(),
            )
            .await
            .unwrap();

            assert_eq!(
                host.operation_names(),
                vec![
                    "get_branch_tip",
                    "create_blob",
                    "create_tree",
                    "create_commit",
                    "update_ref"
                ]
            );
        }

        #[tokio::test]
        async fn commit_has_single_parent() {
            let host = MockHost::new();
            let repo = host.seed_repository("octocat/demo", &[("a.txt", "old")]);
            let before = host.branch_head(&repo, "main").unwrap();

            let outcome = commit_changes(
                &host,
                &request(&repo, vec![FileChange::text("b.txt", "x")]),
                &CommitOptions::default(),
            )
            .await
            .unwrap();

            assert_eq!(outcome.parent, before);
            assert_eq!(host.commit_parents(&repo, &outcome.commit), vec![before]);
            assert_eq!(host.commit_message(&repo, &outcome.commit).as_deref(), Some("Publish"));
        }

        #[tokio::test]
        async fn empty_batch_sends_nothing() {
            let host = MockHost::new();
            let repo = host.seed_repository("octocat/demo", &[]);

            let err = commit_changes(&host, &request(&repo, vec![]), &CommitOptions::default())
                .await
                .unwrap_err();

            assert!(matches!(err, ForgeError::InvalidInput(_)));
            assert!(host.operations().is_empty());
        }

        #[tokio::test]
        async fn malformed_path_sends_nothing() {
            let host = MockHost::new();
            let repo = host.seed_repository("octocat/demo", &[]);

            let err = commit_changes(
                &host,
                &request(&repo, vec![FileChange::text("../escape", "x")]),
                &CommitOptions::default(),
            )
            .await
            .unwrap_err();

            assert!(matches!(err, ForgeError::InvalidInput(_)));
            assert!(host.operations().is_empty());
        }

        #[tokio::test]
        async fn blob_failure_stops_before_tree() {
            let host = MockHost::new().fail_on(FailOn::CreateBlob(ForgeError::Network(
                "connection reset".into(),
            )));
            let repo = host.seed_repository("octocat/demo", &[("a.txt", "old")]);
            let before = host.branch_head(&repo, "main");

            let err = commit_changes(
                &host,
                &request(
                    &repo,
                    vec![FileChange::text("a.txt", "new"), FileChange::text("b.txt", "x")],
                ),
                &CommitOptions::default(),
            )
            .await
            .unwrap_err();

            assert!(matches!(err, ForgeError::Network(_)));
            assert_eq!(host.branch_head(&repo, "main"), before);
            assert!(!host.operation_names().contains(&"create_tree"));
        }

        #[tokio::test]
        async fn binary_files_are_sent_as_base64() {
            let host = MockHost::new();
            let repo = host.seed_repository("octocat/demo", &[]);

            commit_changes(
                &host,
                &request(&repo, vec![FileChange::binary("logo.bin", &[0, 159, 146, 150])]),
                &CommitOptions::default(),
            )
            .await
            .unwrap();

            assert!(host.operations().contains(&MockOperation::CreateBlob {
                repo: repo.clone(),
                encoding: BlobEncoding::Base64,
            }));
        }

        #[tokio::test]
        async fn zero_concurrency_is_treated_as_one() {
            let host = MockHost::new();
            let repo = host.seed_repository("octocat/demo", &[]);

            let outcome = commit_changes(
                &host,
                &request(&repo, vec![FileChange::text("a", "1"), FileChange::text("b", "2")]),
                &CommitOptions {
                    blob_concurrency: 0,
                },
            )
            .await
            .unwrap();

            assert_eq!(outcome.files, vec!["a", "b"]);
        }
    }

    #[test]
    fn outcome_urls() {
        let outcome = CommitOutcome {
            repo: RepoRef::new("octocat", "demo"),
            branch: "main".into(),
            commit: oid(7),
            tree: oid(8),
            parent: oid(9),
            files: vec![],
        };
        assert_eq!(
            outcome.repository_url("https://github.com/"),
            "https://github.com/octocat/demo"
        );
        assert_eq!(
            outcome.commit_url("https://github.com"),
            format!("https://github.com/octocat/demo/commit/{}", oid(7))
        );
    }
}
