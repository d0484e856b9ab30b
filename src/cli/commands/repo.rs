//! repo command - List, show, create, and delete repositories

use anyhow::{bail, Context as _, Result};
use serde_json::json;

use super::{connect, parse_repo};
use crate::cli::args::RepoAction;
use crate::cli::Context;
use crate::forge::{CreateRepoRequest, HostingApi, ListReposOpts, Repository};

/// Run a repo subcommand.
pub fn repo(ctx: &Context, action: RepoAction) -> Result<()> {
    // Refuse before connecting so a missing --yes costs no request.
    if let RepoAction::Delete { repo, yes: false } = &action {
        bail!(
            "refusing to delete {} without --yes; deletion cannot be undone",
            repo
        );
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(repo_async(ctx, action))
}

async fn repo_async(ctx: &Context, action: RepoAction) -> Result<()> {
    let config = ctx.load_config()?;

    match action {
        RepoAction::List {
            visibility,
            sort,
            page,
            per_page,
        } => {
            let opts = ListReposOpts {
                visibility: visibility.into(),
                sort: sort.into(),
                page,
                per_page,
            };
            let client = connect(&config).await?;
            let repos = client
                .list_repositories(opts)
                .await
                .context("failed to list repositories")?;

            ctx.out.result(&repos, |repos| {
                if repos.is_empty() {
                    return vec!["No repositories.".to_string()];
                }
                repos.iter().map(summary_line).collect()
            })?;
        }

        RepoAction::Get { repo } => {
            let repo = parse_repo(&repo)?;
            let client = connect(&config).await?;
            let found = client
                .get_repository(&repo)
                .await
                .with_context(|| format!("failed to get {}", repo))?;

            ctx.out.result(&found, details)?;
        }

        RepoAction::Exists { repo } => {
            let repo = parse_repo(&repo)?;
            let client = connect(&config).await?;
            let found = client
                .repository_exists(&repo)
                .await
                .with_context(|| format!("failed to look up {}", repo))?;

            let value = json!({ "exists": found.is_some(), "repository": found });
            ctx.out.result(&value, |_| match &found {
                Some(found) => vec![format!("{} exists ({})", found.full_name, found.html_url)],
                None => vec![format!("{} does not exist", repo)],
            })?;
        }

        RepoAction::Create {
            name,
            description,
            private,
            no_auto_init,
            gitignore_template,
        } => {
            let request = CreateRepoRequest {
                description,
                private,
                auto_init: !no_auto_init,
                gitignore_template,
                ..CreateRepoRequest::new(name)
            };
            let client = connect(&config).await?;
            let created = client
                .create_repository(request)
                .await
                .context("failed to create repository")?;

            ctx.out.result(&created, |created| {
                vec![format!("Created {} ({})", created.full_name, created.html_url)]
            })?;
        }

        RepoAction::Delete { repo, .. } => {
            let repo = parse_repo(&repo)?;
            let client = connect(&config).await?;
            client
                .delete_repository(&repo)
                .await
                .with_context(|| format!("failed to delete {}", repo))?;

            let value = json!({ "deleted": repo.full_name() });
            ctx.out
                .result(&value, |_| vec![format!("Deleted {}", repo)])?;
        }
    }

    Ok(())
}

fn summary_line(repo: &Repository) -> String {
    let visibility = if repo.private { "private" } else { "public" };
    format!("{:<40} {:<8} {}", repo.full_name, visibility, repo.html_url)
}

fn details(repo: &Repository) -> Vec<String> {
    vec![
        format!("Name:           {}", repo.full_name),
        format!(
            "Description:    {}",
            repo.description.as_deref().unwrap_or("-")
        ),
        format!("Private:        {}", repo.private),
        format!("Default branch: {}", repo.default_branch),
        format!("URL:            {}", repo.html_url),
        format!("Clone:          {}", repo.clone_url),
        format!("Updated:        {}", repo.updated_at.format("%Y-%m-%d %H:%M:%S UTC")),
    ]
}
