//! forge::mock
//!
//! In-memory hosting API for deterministic testing.
//!
//! # Design
//!
//! [`MockHost`] implements [`HostingApi`] on top of a tiny object store:
//! repositories hold refs and content-addressed blobs, trees, and commits.
//! Trees are flat maps from full path to blob, which is all the commit
//! workflow needs. Object ids are SHA-256 digests, so identical content
//! always yields the same blob id.
//!
//! Ref updates follow the hosting rules: a non-forced update is accepted
//! only when the new commit descends from the current tip, otherwise it
//! fails with `Conflict`.
//!
//! Every operation yields to the runtime once before touching state, so
//! workflows joined on the same task interleave the way independent
//! clients would.
//!
//! # Example
//!
//! ```
//! use ghpublish::forge::mock::MockHost;
//! use ghpublish::forge::HostingApi;
//!
//! # tokio_test::block_on(async {
//! let host = MockHost::new();
//! let repo = host.seed_repository("octocat/demo", &[("README.md", "# demo\n")]);
//!
//! let tip = host.get_branch_tip(&repo, "main").await.unwrap();
//! assert_eq!(host.branch_head(&repo, "main"), Some(tip.commit));
//! assert_eq!(host.read_file(&repo, "main", "README.md").as_deref(), Some("# demo\n"));
//! # });
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine as _;
use chrono::Utc;
use sha2::{Digest, Sha256};

use super::traits::{
    BlobEncoding, BranchTip, CommitSummary, CreateRepoRequest, FieldError, FileMode, ForgeError,
    HostingApi, ListReposOpts, NewCommit, ObjectId, PutFileRequest, RateLimit, RepoRef, RepoSort,
    Repository, TreeEntry, User, Visibility,
};

/// Branch created by seeded and auto-initialized repositories.
pub const MOCK_DEFAULT_BRANCH: &str = "main";

/// Mock hosting API for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockHost {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockHostInner>>,
}

#[derive(Debug)]
struct MockHostInner {
    /// Login of the authenticated user; owner of created repositories.
    login: String,
    /// Repositories by full name.
    repositories: BTreeMap<String, MockRepo>,
    next_repo_id: u64,
    /// Monotonic counter mixed into commit ids.
    sequence: u64,
    /// Calls made so far, reported by `get_rate_limit`.
    used: u64,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

#[derive(Debug)]
struct MockRepo {
    repository: Repository,
    refs: BTreeMap<String, ObjectId>,
    objects: HashMap<ObjectId, MockObject>,
}

type Tree = BTreeMap<String, (FileMode, ObjectId)>;

#[derive(Debug, Clone)]
enum MockObject {
    Blob(Vec<u8>),
    Tree(Tree),
    Commit {
        tree: ObjectId,
        parents: Vec<ObjectId>,
        message: String,
    },
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    GetRateLimit(ForgeError),
    ListRepositories(ForgeError),
    GetRepository(ForgeError),
    CreateRepository(ForgeError),
    DeleteRepository(ForgeError),
    GetFileSha(ForgeError),
    /// Fail `push_single_file` for one path only.
    PushFile { path: String, error: ForgeError },
    GetBranchTip(ForgeError),
    CreateBlob(ForgeError),
    CreateTree(ForgeError),
    CreateCommit(ForgeError),
    UpdateRef(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetRateLimit,
    ListRepositories {
        opts: ListReposOpts,
    },
    GetRepository {
        repo: RepoRef,
    },
    CreateRepository {
        name: String,
        private: bool,
    },
    DeleteRepository {
        repo: RepoRef,
    },
    GetFileSha {
        repo: RepoRef,
        path: String,
        branch: String,
    },
    PushSingleFile {
        repo: RepoRef,
        path: String,
        branch: String,
        existing_sha: Option<ObjectId>,
    },
    GetBranchTip {
        repo: RepoRef,
        branch: String,
    },
    CreateBlob {
        repo: RepoRef,
        encoding: BlobEncoding,
    },
    CreateTree {
        repo: RepoRef,
        base_tree: ObjectId,
        paths: Vec<String>,
    },
    CreateCommit {
        repo: RepoRef,
        tree: ObjectId,
        parent: ObjectId,
    },
    UpdateRef {
        repo: RepoRef,
        branch: String,
        sha: ObjectId,
        force: bool,
    },
}

impl MockOperation {
    /// Short operation name, e.g. `"create_tree"`.
    pub fn name(&self) -> &'static str {
        match self {
            MockOperation::GetRateLimit => "get_rate_limit",
            MockOperation::ListRepositories { .. } => "list_repositories",
            MockOperation::GetRepository { .. } => "get_repository",
            MockOperation::CreateRepository { .. } => "create_repository",
            MockOperation::DeleteRepository { .. } => "delete_repository",
            MockOperation::GetFileSha { .. } => "get_file_sha",
            MockOperation::PushSingleFile { .. } => "push_single_file",
            MockOperation::GetBranchTip { .. } => "get_branch_tip",
            MockOperation::CreateBlob { .. } => "create_blob",
            MockOperation::CreateTree { .. } => "create_tree",
            MockOperation::CreateCommit { .. } => "create_commit",
            MockOperation::UpdateRef { .. } => "update_ref",
        }
    }
}

impl MockHost {
    /// Create an empty mock host authenticated as `mock-user`.
    pub fn new() -> Self {
        Self::with_login("mock-user")
    }

    /// Create an empty mock host authenticated as `login`.
    pub fn with_login(login: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockHostInner {
                login: login.into(),
                repositories: BTreeMap::new(),
                next_repo_id: 1,
                sequence: 0,
                used: 0,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use ghpublish::forge::mock::{FailOn, MockHost};
    /// use ghpublish::forge::ForgeError;
    ///
    /// let host = MockHost::new().fail_on(FailOn::CreateTree(ForgeError::Api {
    ///     status: 500,
    ///     body: "boom".into(),
    /// }));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.set_fail_on(fail_on);
        self
    }

    /// Configure a failure on a shared handle.
    pub fn set_fail_on(&self, fail_on: FailOn) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = Some(fail_on);
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Names of recorded operations, in call order.
    pub fn operation_names(&self) -> Vec<&'static str> {
        self.operations().iter().map(MockOperation::name).collect()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Create a repository whose `main` branch holds `files` in one commit.
    ///
    /// `full_name` is `owner/name`; an existing repository of that name is
    /// replaced.
    pub fn seed_repository(&self, full_name: &str, files: &[(&str, &str)]) -> RepoRef {
        let repo = RepoRef::parse(full_name).unwrap();
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_repo_id;
        inner.next_repo_id += 1;

        let mut mock = MockRepo::new(new_repository(id, &repo, None, false));
        let files: Vec<(String, Vec<u8>)> = files
            .iter()
            .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec()))
            .collect();
        let sequence = inner.next_sequence();
        mock.commit_files(MOCK_DEFAULT_BRANCH, &files, "Initial commit", sequence);

        inner.repositories.insert(repo.full_name(), mock);
        repo
    }

    /// Commit directly to a branch, bypassing the API.
    ///
    /// Simulates another client pushing between a workflow's read and write.
    pub fn commit_directly(&self, repo: &RepoRef, branch: &str, path: &str, content: &str) -> ObjectId {
        let mut inner = self.inner.lock().unwrap();
        let sequence = inner.next_sequence();
        let mock = inner.repositories.get_mut(&repo.full_name()).unwrap();
        mock.commit_files(
            branch,
            &[(path.to_string(), content.as_bytes().to_vec())],
            &format!("Update {}", path),
            sequence,
        )
    }

    /// Commit a branch points at.
    pub fn branch_head(&self, repo: &RepoRef, branch: &str) -> Option<ObjectId> {
        let inner = self.inner.lock().unwrap();
        inner
            .repositories
            .get(&repo.full_name())
            .and_then(|r| r.refs.get(branch).cloned())
    }

    /// Content of a file at a branch tip, as UTF-8 (lossy).
    pub fn read_file(&self, repo: &RepoRef, branch: &str, path: &str) -> Option<String> {
        self.files_at(repo, branch).remove(path)
    }

    /// All files at a branch tip.
    pub fn files_at(&self, repo: &RepoRef, branch: &str) -> BTreeMap<String, String> {
        let inner = self.inner.lock().unwrap();
        let Some(mock) = inner.repositories.get(&repo.full_name()) else {
            return BTreeMap::new();
        };
        let Some(tree) = mock.refs.get(branch).and_then(|head| mock.commit_tree(head)) else {
            return BTreeMap::new();
        };
        tree.iter()
            .filter_map(|(path, (_, sha))| match mock.objects.get(sha) {
                Some(MockObject::Blob(bytes)) => {
                    Some((path.clone(), String::from_utf8_lossy(bytes).into_owned()))
                }
                _ => None,
            })
            .collect()
    }

    /// Parents of a commit.
    pub fn commit_parents(&self, repo: &RepoRef, sha: &ObjectId) -> Vec<ObjectId> {
        let inner = self.inner.lock().unwrap();
        match inner
            .repositories
            .get(&repo.full_name())
            .and_then(|r| r.objects.get(sha))
        {
            Some(MockObject::Commit { parents, .. }) => parents.clone(),
            _ => Vec::new(),
        }
    }

    /// Message of a commit.
    pub fn commit_message(&self, repo: &RepoRef, sha: &ObjectId) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        match inner
            .repositories
            .get(&repo.full_name())
            .and_then(|r| r.objects.get(sha))
        {
            Some(MockObject::Commit { message, .. }) => Some(message.clone()),
            _ => None,
        }
    }

    /// Commits reachable from a branch tip along first parents, newest first.
    pub fn history(&self, repo: &RepoRef, branch: &str) -> Vec<ObjectId> {
        let mut commits = Vec::new();
        let mut next = self.branch_head(repo, branch);
        while let Some(sha) = next {
            next = self.commit_parents(repo, &sha).into_iter().next();
            commits.push(sha);
        }
        commits
    }

    /// Number of stored blobs in a repository.
    pub fn blob_count(&self, repo: &RepoRef) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .repositories
            .get(&repo.full_name())
            .map(|r| {
                r.objects
                    .values()
                    .filter(|o| matches!(o, MockObject::Blob(_)))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Record an operation and apply the configured failure, if it matches.
    fn begin(&self, op: MockOperation) -> Result<(), ForgeError> {
        let mut inner = self.inner.lock().unwrap();
        inner.used += 1;
        let failure = match (&inner.fail_on, &op) {
            (Some(FailOn::GetRateLimit(e)), MockOperation::GetRateLimit)
            | (Some(FailOn::ListRepositories(e)), MockOperation::ListRepositories { .. })
            | (Some(FailOn::GetRepository(e)), MockOperation::GetRepository { .. })
            | (Some(FailOn::CreateRepository(e)), MockOperation::CreateRepository { .. })
            | (Some(FailOn::DeleteRepository(e)), MockOperation::DeleteRepository { .. })
            | (Some(FailOn::GetFileSha(e)), MockOperation::GetFileSha { .. })
            | (Some(FailOn::GetBranchTip(e)), MockOperation::GetBranchTip { .. })
            | (Some(FailOn::CreateBlob(e)), MockOperation::CreateBlob { .. })
            | (Some(FailOn::CreateTree(e)), MockOperation::CreateTree { .. })
            | (Some(FailOn::CreateCommit(e)), MockOperation::CreateCommit { .. })
            | (Some(FailOn::UpdateRef(e)), MockOperation::UpdateRef { .. }) => Some(e.clone()),
            (Some(FailOn::PushFile { path, error }), MockOperation::PushSingleFile { path: p, .. })
                if path == p =>
            {
                Some(error.clone())
            }
            _ => None,
        };
        inner.operations.push(op);
        failure.map_or(Ok(()), Err)
    }

    /// Run `f` against a repository.
    fn with_repo<T>(
        &self,
        repo: &RepoRef,
        f: impl FnOnce(&mut MockRepo, u64) -> Result<T, ForgeError>,
    ) -> Result<T, ForgeError> {
        let mut inner = self.inner.lock().unwrap();
        let sequence = inner.next_sequence();
        let mock = inner
            .repositories
            .get_mut(&repo.full_name())
            .ok_or_else(|| ForgeError::NotFound(format!("repository {}", repo)))?;
        f(mock, sequence)
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHostInner {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

impl MockRepo {
    fn new(repository: Repository) -> Self {
        Self {
            repository,
            refs: BTreeMap::new(),
            objects: HashMap::new(),
        }
    }

    fn store(&mut self, id: ObjectId, object: MockObject) -> ObjectId {
        self.objects.entry(id.clone()).or_insert(object);
        id
    }

    fn store_blob(&mut self, bytes: Vec<u8>) -> ObjectId {
        let id = object_id("blob", &bytes);
        self.store(id, MockObject::Blob(bytes))
    }

    fn store_tree(&mut self, tree: Tree) -> ObjectId {
        let mut payload = Vec::new();
        for (path, (mode, sha)) in &tree {
            payload.extend_from_slice(format!("{} {}\0{}\n", mode.as_str(), path, sha).as_bytes());
        }
        let id = object_id("tree", &payload);
        self.store(id, MockObject::Tree(tree))
    }

    fn store_commit(
        &mut self,
        tree: ObjectId,
        parents: Vec<ObjectId>,
        message: &str,
        sequence: u64,
    ) -> ObjectId {
        let mut payload = format!("tree {}\n", tree);
        for parent in &parents {
            payload.push_str(&format!("parent {}\n", parent));
        }
        payload.push_str(&format!("sequence {}\n\n{}", sequence, message));
        let id = object_id("commit", payload.as_bytes());
        self.store(
            id,
            MockObject::Commit {
                tree,
                parents,
                message: message.to_string(),
            },
        )
    }

    fn commit_tree(&self, commit: &ObjectId) -> Option<&Tree> {
        match self.objects.get(commit) {
            Some(MockObject::Commit { tree, .. }) => match self.objects.get(tree) {
                Some(MockObject::Tree(entries)) => Some(entries),
                _ => None,
            },
            _ => None,
        }
    }

    /// True if `ancestor` is reachable from `descendant` (inclusive).
    fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![descendant.clone()];
        while let Some(sha) = stack.pop() {
            if &sha == ancestor {
                return true;
            }
            if !seen.insert(sha.clone()) {
                continue;
            }
            if let Some(MockObject::Commit { parents, .. }) = self.objects.get(&sha) {
                stack.extend(parents.iter().cloned());
            }
        }
        false
    }

    /// Commit `files` on top of `branch` (creating it if absent).
    fn commit_files(
        &mut self,
        branch: &str,
        files: &[(String, Vec<u8>)],
        message: &str,
        sequence: u64,
    ) -> ObjectId {
        let parent = self.refs.get(branch).cloned();
        let mut tree = parent
            .as_ref()
            .and_then(|p| self.commit_tree(p))
            .cloned()
            .unwrap_or_default();
        for (path, content) in files {
            let blob = self.store_blob(content.clone());
            tree.insert(path.clone(), (FileMode::Regular, blob));
        }
        let tree = self.store_tree(tree);
        let commit = self.store_commit(tree, parent.into_iter().collect(), message, sequence);
        self.refs.insert(branch.to_string(), commit.clone());
        commit
    }

    fn branch(&self, branch: &str) -> Result<&ObjectId, ForgeError> {
        self.refs.get(branch).ok_or_else(|| {
            ForgeError::NotFound(format!(
                "branch '{}' in {}",
                branch, self.repository.full_name
            ))
        })
    }

    fn commit_urls(&self, sha: &ObjectId) -> CommitSummary {
        CommitSummary {
            sha: sha.clone(),
            url: format!(
                "https://api.github.com/repos/{}/git/commits/{}",
                self.repository.full_name, sha
            ),
            html_url: format!(
                "https://github.com/{}/commit/{}",
                self.repository.full_name, sha
            ),
        }
    }
}

fn object_id(kind: &str, payload: &[u8]) -> ObjectId {
    let mut hasher = Sha256::new();
    hasher.update(format!("{} {}\0", kind, payload.len()).as_bytes());
    hasher.update(payload);
    ObjectId::new(hex::encode(hasher.finalize())).expect("sha256 digest is a valid object id")
}

fn new_repository(id: u64, repo: &RepoRef, description: Option<String>, private: bool) -> Repository {
    let now = Utc::now();
    let full_name = repo.full_name();
    Repository {
        id,
        name: repo.name.clone(),
        full_name: full_name.clone(),
        description,
        html_url: format!("https://github.com/{}", full_name),
        clone_url: format!("https://github.com/{}.git", full_name),
        ssh_url: format!("git@github.com:{}.git", full_name),
        default_branch: MOCK_DEFAULT_BRANCH.to_string(),
        private,
        created_at: now,
        updated_at: now,
        pushed_at: None,
    }
}

fn unprocessable(message: impl Into<String>) -> ForgeError {
    ForgeError::Api {
        status: 422,
        body: format!(r#"{{"message":"{}"}}"#, message.into()),
    }
}

#[async_trait]
impl HostingApi for MockHost {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_rate_limit(&self) -> Result<RateLimit, ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::GetRateLimit)?;

        let inner = self.inner.lock().unwrap();
        let limit = 5000;
        Ok(RateLimit {
            limit,
            remaining: limit.saturating_sub(inner.used),
            reset: 4_102_444_800,
            used: inner.used,
        })
    }

    async fn list_repositories(&self, opts: ListReposOpts) -> Result<Vec<Repository>, ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::ListRepositories { opts })?;

        let inner = self.inner.lock().unwrap();
        let mut repos: Vec<Repository> = inner
            .repositories
            .values()
            .map(|r| r.repository.clone())
            .filter(|r| match opts.visibility {
                Visibility::All => true,
                Visibility::Public => !r.private,
                Visibility::Private => r.private,
            })
            .collect();

        match opts.sort {
            RepoSort::FullName => repos.sort_by(|a, b| a.full_name.cmp(&b.full_name)),
            RepoSort::Created => repos.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            RepoSort::Updated => repos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
            RepoSort::Pushed => repos.sort_by(|a, b| b.pushed_at.cmp(&a.pushed_at)),
        }

        let per_page = opts.effective_per_page() as usize;
        let skip = (opts.effective_page() as usize - 1) * per_page;
        Ok(repos.into_iter().skip(skip).take(per_page).collect())
    }

    async fn get_repository(&self, repo: &RepoRef) -> Result<Repository, ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::GetRepository { repo: repo.clone() })?;

        self.with_repo(repo, |mock, _| Ok(mock.repository.clone()))
    }

    async fn create_repository(
        &self,
        request: CreateRepoRequest,
    ) -> Result<Repository, ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::CreateRepository {
            name: request.name.clone(),
            private: request.private,
        })?;

        let mut inner = self.inner.lock().unwrap();
        let repo = RepoRef::new(inner.login.clone(), request.name.clone());
        if request.name.trim().is_empty() {
            return Err(ForgeError::Validation {
                message: "Repository creation failed.".into(),
                fields: vec![FieldError {
                    resource: Some("Repository".into()),
                    field: Some("name".into()),
                    code: Some("missing_field".into()),
                    message: None,
                }],
            });
        }
        if inner.repositories.contains_key(&repo.full_name()) {
            return Err(ForgeError::Validation {
                message: "Repository creation failed.".into(),
                fields: vec![FieldError {
                    resource: Some("Repository".into()),
                    field: Some("name".into()),
                    code: Some("custom".into()),
                    message: Some("name already exists on this account".into()),
                }],
            });
        }

        let id = inner.next_repo_id;
        inner.next_repo_id += 1;
        let description = request.effective_description();
        let mut mock = MockRepo::new(new_repository(
            id,
            &repo,
            Some(description.clone()),
            request.private,
        ));
        if request.auto_init {
            let readme = format!("# {}\n\n{}\n", request.name, description);
            let sequence = inner.next_sequence();
            mock.commit_files(
                MOCK_DEFAULT_BRANCH,
                &[("README.md".to_string(), readme.into_bytes())],
                "Initial commit",
                sequence,
            );
        }

        let created = mock.repository.clone();
        inner.repositories.insert(repo.full_name(), mock);
        Ok(created)
    }

    async fn delete_repository(&self, repo: &RepoRef) -> Result<(), ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::DeleteRepository { repo: repo.clone() })?;

        let mut inner = self.inner.lock().unwrap();
        inner
            .repositories
            .remove(&repo.full_name())
            .map(|_| ())
            .ok_or_else(|| ForgeError::NotFound(format!("repository {}", repo)))
    }

    async fn get_file_sha(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
    ) -> Result<Option<ObjectId>, ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::GetFileSha {
            repo: repo.clone(),
            path: path.to_string(),
            branch: branch.to_string(),
        })?;

        let inner = self.inner.lock().unwrap();
        Ok(inner.repositories.get(&repo.full_name()).and_then(|mock| {
            let head = mock.refs.get(branch)?;
            mock.commit_tree(head)?.get(path).map(|(_, sha)| sha.clone())
        }))
    }

    async fn push_single_file(
        &self,
        request: PutFileRequest,
    ) -> Result<CommitSummary, ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::PushSingleFile {
            repo: request.repo.clone(),
            path: request.path.clone(),
            branch: request.branch.clone(),
            existing_sha: request.existing_sha.clone(),
        })?;

        self.with_repo(&request.repo, |mock, sequence| {
            let head = mock.branch(&request.branch)?.clone();
            let current = mock
                .commit_tree(&head)
                .and_then(|tree| tree.get(&request.path))
                .map(|(_, sha)| sha.clone());

            match (&current, &request.existing_sha) {
                (Some(_), None) => {
                    return Err(unprocessable("Invalid request. \\\"sha\\\" wasn't supplied."))
                }
                (Some(current), Some(given)) if current != given => {
                    return Err(ForgeError::Api {
                        status: 409,
                        body: format!(
                            r#"{{"message":"{} does not match {}"}}"#,
                            request.path, given
                        ),
                    })
                }
                _ => {}
            }

            let commit = mock.commit_files(
                &request.branch,
                &[(request.path.clone(), request.content.as_bytes().to_vec())],
                &request.message,
                sequence,
            );
            Ok(mock.commit_urls(&commit))
        })
    }

    async fn get_branch_tip(&self, repo: &RepoRef, branch: &str) -> Result<BranchTip, ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::GetBranchTip {
            repo: repo.clone(),
            branch: branch.to_string(),
        })?;

        self.with_repo(repo, |mock, _| {
            let commit = mock.branch(branch)?.clone();
            match mock.objects.get(&commit) {
                Some(MockObject::Commit { tree, .. }) => Ok(BranchTip {
                    commit,
                    tree: tree.clone(),
                }),
                _ => Err(ForgeError::NotFound(format!("commit {}", commit))),
            }
        })
    }

    async fn create_blob(
        &self,
        repo: &RepoRef,
        content: &str,
        encoding: BlobEncoding,
    ) -> Result<ObjectId, ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::CreateBlob {
            repo: repo.clone(),
            encoding,
        })?;

        let bytes = match encoding {
            BlobEncoding::Utf8 => content.as_bytes().to_vec(),
            BlobEncoding::Base64 => base64::engine::general_purpose::STANDARD
                .decode(content)
                .map_err(|_| unprocessable("content is not valid Base64"))?,
        };
        self.with_repo(repo, |mock, _| Ok(mock.store_blob(bytes)))
    }

    async fn create_tree(
        &self,
        repo: &RepoRef,
        base_tree: &ObjectId,
        entries: &[TreeEntry],
    ) -> Result<ObjectId, ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::CreateTree {
            repo: repo.clone(),
            base_tree: base_tree.clone(),
            paths: entries.iter().map(|e| e.path.clone()).collect(),
        })?;

        self.with_repo(repo, |mock, _| {
            let mut tree = match mock.objects.get(base_tree) {
                Some(MockObject::Tree(tree)) => tree.clone(),
                _ => return Err(unprocessable("base_tree is not a valid tree oid")),
            };
            for entry in entries {
                if !matches!(mock.objects.get(&entry.sha), Some(MockObject::Blob(_))) {
                    return Err(unprocessable(format!(
                        "tree.sha {} is not a valid blob",
                        entry.sha
                    )));
                }
                tree.insert(entry.path.clone(), (entry.mode, entry.sha.clone()));
            }
            Ok(mock.store_tree(tree))
        })
    }

    async fn create_commit(
        &self,
        repo: &RepoRef,
        commit: NewCommit,
    ) -> Result<ObjectId, ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::CreateCommit {
            repo: repo.clone(),
            tree: commit.tree.clone(),
            parent: commit.parent.clone(),
        })?;

        self.with_repo(repo, |mock, sequence| {
            if !matches!(mock.objects.get(&commit.tree), Some(MockObject::Tree(_))) {
                return Err(unprocessable("Tree SHA does not exist"));
            }
            if !matches!(mock.objects.get(&commit.parent), Some(MockObject::Commit { .. })) {
                return Err(unprocessable("Parent SHA does not exist or is not a commit object"));
            }
            Ok(mock.store_commit(commit.tree, vec![commit.parent], &commit.message, sequence))
        })
    }

    async fn update_ref(
        &self,
        repo: &RepoRef,
        branch: &str,
        sha: &ObjectId,
        force: bool,
    ) -> Result<(), ForgeError> {
        tokio::task::yield_now().await;
        self.begin(MockOperation::UpdateRef {
            repo: repo.clone(),
            branch: branch.to_string(),
            sha: sha.clone(),
            force,
        })?;

        self.with_repo(repo, |mock, _| {
            let current = mock.branch(branch)?.clone();
            if !matches!(mock.objects.get(sha), Some(MockObject::Commit { .. })) {
                return Err(unprocessable("Object does not exist"));
            }
            if !force && !mock.is_ancestor(&current, sha) {
                return Err(ForgeError::Conflict(format!(
                    "branch '{}' moved: Update is not a fast forward",
                    branch
                )));
            }
            mock.refs.insert(branch.to_string(), sha.clone());
            mock.repository.pushed_at = Some(Utc::now());
            Ok(())
        })
    }
}
