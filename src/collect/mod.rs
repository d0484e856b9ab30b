//! collect
//!
//! Gather local project files to publish.
//!
//! # Rules
//!
//! - Only the configured sub-directories of the root are walked (default
//!   `backend` and `frontend`); a missing sub-directory is skipped
//! - Any path component on the exclusion list prunes that entry, and files
//!   with an excluded extension are dropped
//! - Files that are not valid UTF-8 are skipped
//! - Paths are relative to the root, `/`-separated, and sorted
//! - A `README.md` and a `.gitignore` are appended unless disabled or
//!   already collected
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use ghpublish::collect::{collect_project_files, CollectOptions};
//!
//! let files = collect_project_files(Path::new("."), &CollectOptions::default())?;
//! for file in &files {
//!     println!("{}", file.path);
//! }
//! # Ok::<(), ghpublish::collect::CollectError>(())
//! ```

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::publish::FileChange;

/// Sub-directories collected by default.
pub const DEFAULT_INCLUDE_DIRS: [&str; 2] = ["backend", "frontend"];

/// Path components never collected.
pub const DEFAULT_EXCLUDED_NAMES: [&str; 16] = [
    "__pycache__",
    "node_modules",
    ".venv",
    "venv",
    "dist",
    "build",
    ".git",
    ".next",
    ".cache",
    ".mypy_cache",
    ".pytest_cache",
    ".DS_Store",
    ".rsync-filter",
    ".dirlock",
    "CACHEDIR.TAG",
    "missing_stubs",
];

/// File extensions never collected.
pub const DEFAULT_EXCLUDED_EXTENSIONS: [&str; 3] = ["pyc", "swp", "swo"];

const GITIGNORE: &str = "\
# Python
__pycache__/
*.py[cod]
*.egg-info/
.venv/
venv/
.mypy_cache/
.pytest_cache/

# Node
node_modules/
npm-debug.log*
yarn-debug.log*
yarn-error.log*

# Build outputs
dist/
build/
.next/
out/
.cache/

# Environment variables
.env
.env.local

# IDE
.vscode/
.idea/
*.swp
*.swo
*~

# Logs
*.log
logs/

# OS
Thumbs.db
.DS_Store
";

/// Errors collecting files.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The project root does not exist or is not a directory.
    #[error("project root {0} is not a directory")]
    RootNotFound(PathBuf),

    /// Directory traversal failed.
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// What to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectOptions {
    /// Sub-directories of the root to walk
    pub include_dirs: Vec<String>,
    /// Additional exclusions: a name matches a path component, `*.ext`
    /// matches a file extension
    pub extra_excludes: Vec<String>,
    /// Append a README.md and a .gitignore
    pub synthesize: bool,
    /// Title of the synthesized README; defaults to the root's name
    pub project_name: Option<String>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            include_dirs: DEFAULT_INCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            extra_excludes: Vec::new(),
            synthesize: true,
            project_name: None,
        }
    }
}

/// Compiled exclusion rules.
struct Exclusions {
    names: Vec<String>,
    extensions: Vec<String>,
}

impl Exclusions {
    fn new(extra: &[String]) -> Self {
        let mut names: Vec<String> = DEFAULT_EXCLUDED_NAMES.iter().map(|s| s.to_string()).collect();
        let mut extensions: Vec<String> = DEFAULT_EXCLUDED_EXTENSIONS
            .iter()
            .map(|s| s.to_string())
            .collect();
        for pattern in extra {
            match pattern.strip_prefix("*.") {
                Some(ext) => extensions.push(ext.to_string()),
                None => names.push(pattern.clone()),
            }
        }
        Self { names, extensions }
    }

    fn excludes(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        if self.names.iter().any(|n| *n == name) {
            return true;
        }
        entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .map(|ext| self.extensions.iter().any(|e| *e == ext.to_string_lossy()))
                .unwrap_or(false)
    }
}

/// Collect the project files under `root`.
///
/// # Errors
///
/// - `CollectError::RootNotFound` if `root` is not a directory
/// - `CollectError::Walk` if a directory cannot be read
pub fn collect_project_files(
    root: &Path,
    options: &CollectOptions,
) -> Result<Vec<FileChange>, CollectError> {
    if !root.is_dir() {
        return Err(CollectError::RootNotFound(root.to_path_buf()));
    }

    let exclusions = Exclusions::new(&options.extra_excludes);
    let mut files = Vec::new();

    for dir in &options.include_dirs {
        let start = root.join(dir);
        if !start.is_dir() {
            debug!(dir = %start.display(), "include directory missing, skipping");
            continue;
        }

        let walker = WalkDir::new(&start)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !exclusions.excludes(entry));

        for entry in walker {
            let entry = entry.map_err(|source| CollectError::Walk {
                path: start.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(path) = relative_path(root, entry.path()) else {
                continue;
            };

            match std::fs::read(entry.path()) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(content) => files.push(FileChange::text(path, content)),
                    Err(_) => debug!(path = %path, "skipped binary file"),
                },
                Err(e) => debug!(path = %path, error = %e, "skipped unreadable file"),
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);

    if options.synthesize {
        let name = options
            .project_name
            .clone()
            .or_else(|| project_name(root))
            .unwrap_or_else(|| "project".to_string());
        for synthesized in [
            FileChange::text("README.md", readme(&name, &options.include_dirs)),
            FileChange::text(".gitignore", GITIGNORE),
        ] {
            if !files.iter().any(|f| f.path == synthesized.path) {
                files.push(synthesized);
            }
        }
    }

    Ok(files)
}

/// `path` relative to `root`, `/`-separated; `None` for non-UTF-8 names.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

fn project_name(root: &Path) -> Option<String> {
    let canonical = std::fs::canonicalize(root).ok()?;
    canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

fn readme(name: &str, include_dirs: &[String]) -> String {
    let mut readme = format!("# {}\n\nGenerated project.\n", name);
    if !include_dirs.is_empty() {
        readme.push_str("\n## Project Structure\n\n");
        for dir in include_dirs {
            readme.push_str(&format!("- `{}/`\n", dir.trim_end_matches('/')));
        }
    }
    readme
}
