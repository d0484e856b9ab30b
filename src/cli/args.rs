//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file instead of the default locations
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Print results as JSON

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::forge::{RepoSort, Visibility};

/// Commit message used by `push` when none is given.
pub const DEFAULT_PUSH_MESSAGE: &str = "Update project files";

/// ghpub - publish project files to GitHub
#[derive(Parser, Debug)]
#[command(name = "ghpub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the remaining API budget
    #[command(name = "rate-limit")]
    RateLimit,

    /// Manage repositories of the authenticated user
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },

    /// Create or update a single file (one commit)
    #[command(
        name = "push-file",
        after_help = "\
EXAMPLES:
    # Upload a local file
    ghpub push-file octocat/demo docs/guide.md --file ./guide.md -m \"Add guide\"

    # Write literal content to a branch
    ghpub push-file octocat/demo VERSION --content 1.2.0 -m \"Bump\" --branch release"
    )]
    PushFile {
        /// Target repository as owner/name
        #[arg(value_name = "OWNER/REPO")]
        repo: String,

        /// Path of the file inside the repository
        path: String,

        /// Read content from this local file
        #[arg(long, value_name = "LOCAL", conflicts_with = "content", required_unless_present = "content")]
        file: Option<PathBuf>,

        /// Use this text as the content
        #[arg(long)]
        content: Option<String>,

        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Target branch (defaults to the configured default branch)
        #[arg(long)]
        branch: Option<String>,
    },

    /// Publish a project directory as one commit
    #[command(
        long_about = "Publish a project directory as one commit.\n\n\
            Files are collected from the project root (see `ghpub collect`), \
            uploaded as blobs, assembled into a tree on top of the branch tip, \
            and committed. The branch only moves once the commit exists, so a \
            failure part-way leaves it untouched.\n\n\
            With --legacy, files are pushed one commit per file instead and a \
            failure on one file does not stop the others.",
        after_help = "\
EXAMPLES:
    # Publish ./backend and ./frontend to main
    ghpub push octocat/demo

    # Publish another project to a feature branch
    ghpub push octocat/demo --dir ../generated --branch preview -m \"Regenerate\"

    # Overwrite a branch that has diverged
    ghpub push octocat/demo --force"
    )]
    Push {
        /// Target repository as owner/name
        #[arg(value_name = "OWNER/REPO")]
        repo: String,

        /// Project root to collect files from
        #[arg(long, value_name = "ROOT", default_value = ".")]
        dir: PathBuf,

        /// Target branch (defaults to the configured default branch)
        #[arg(long)]
        branch: Option<String>,

        /// Commit message
        #[arg(short, long, default_value = DEFAULT_PUSH_MESSAGE)]
        message: String,

        /// Move the branch even if it is not a fast-forward
        #[arg(long, conflicts_with = "legacy")]
        force: bool,

        /// Push one commit per file
        #[arg(long)]
        legacy: bool,
    },

    /// List the files `push` would publish (no network access)
    Collect {
        /// Project root to collect files from
        #[arg(long, value_name = "ROOT", default_value = ".")]
        dir: PathBuf,
    },
}

/// Repository subcommands
#[derive(Subcommand, Debug)]
pub enum RepoAction {
    /// List repositories
    List {
        /// Visibility filter
        #[arg(long, value_enum, default_value_t = VisibilityArg::All)]
        visibility: VisibilityArg,

        /// Sort key
        #[arg(long, value_enum, default_value_t = SortArg::Updated)]
        sort: SortArg,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Page size (capped at 100)
        #[arg(long, default_value_t = 30)]
        per_page: u32,
    },

    /// Show one repository
    Get {
        /// Repository as owner/name
        #[arg(value_name = "OWNER/REPO")]
        repo: String,
    },

    /// Check whether a repository exists
    Exists {
        /// Repository as owner/name
        #[arg(value_name = "OWNER/REPO")]
        repo: String,
    },

    /// Create a repository for the authenticated user
    Create {
        /// Repository name
        name: String,

        /// Repository description
        #[arg(long)]
        description: Option<String>,

        /// Make the repository private
        #[arg(long)]
        private: bool,

        /// Do not create an initial commit
        #[arg(long)]
        no_auto_init: bool,

        /// Gitignore template (e.g. Python, Node)
        #[arg(long, value_name = "TEMPLATE")]
        gitignore_template: Option<String>,
    },

    /// Delete a repository
    Delete {
        /// Repository as owner/name
        #[arg(value_name = "OWNER/REPO")]
        repo: String,

        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Visibility filter for `repo list`
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityArg {
    All,
    Public,
    Private,
}

impl From<VisibilityArg> for Visibility {
    fn from(arg: VisibilityArg) -> Self {
        match arg {
            VisibilityArg::All => Visibility::All,
            VisibilityArg::Public => Visibility::Public,
            VisibilityArg::Private => Visibility::Private,
        }
    }
}

/// Sort key for `repo list`
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    Created,
    Updated,
    Pushed,
    FullName,
}

impl From<SortArg> for RepoSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Created => RepoSort::Created,
            SortArg::Updated => RepoSort::Updated,
            SortArg::Pushed => RepoSort::Pushed,
            SortArg::FullName => RepoSort::FullName,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn push_defaults() {
        let cli = Cli::try_parse_from(["ghpub", "push", "octocat/demo"]).unwrap();
        match cli.command {
            Command::Push {
                repo,
                dir,
                branch,
                message,
                force,
                legacy,
            } => {
                assert_eq!(repo, "octocat/demo");
                assert_eq!(dir, PathBuf::from("."));
                assert!(branch.is_none());
                assert_eq!(message, DEFAULT_PUSH_MESSAGE);
                assert!(!force);
                assert!(!legacy);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn force_conflicts_with_legacy() {
        let result = Cli::try_parse_from(["ghpub", "push", "o/r", "--force", "--legacy"]);
        assert!(result.is_err());
    }

    #[test]
    fn push_file_requires_a_source() {
        let result = Cli::try_parse_from(["ghpub", "push-file", "o/r", "a.txt", "-m", "msg"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "ghpub", "push-file", "o/r", "a.txt", "-m", "msg", "--content", "x", "--file", "y",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ghpub", "collect", "--json", "-q"]).unwrap();
        assert!(cli.json);
        assert!(cli.quiet);
    }

    #[test]
    fn repo_list_value_enums() {
        let cli = Cli::try_parse_from([
            "ghpub",
            "repo",
            "list",
            "--visibility",
            "private",
            "--sort",
            "full-name",
            "--per-page",
            "500",
        ])
        .unwrap();
        match cli.command {
            Command::Repo {
                action:
                    RepoAction::List {
                        visibility,
                        sort,
                        page,
                        per_page,
                    },
            } => {
                assert_eq!(Visibility::from(visibility), Visibility::Private);
                assert_eq!(RepoSort::from(sort), RepoSort::FullName);
                assert_eq!(page, 1);
                assert_eq!(per_page, 500);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
