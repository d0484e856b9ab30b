//! collect command - List the files `push` would publish

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::cli::Context;
use crate::collect::collect_project_files;

#[derive(Serialize)]
struct CollectedFile<'a> {
    path: &'a str,
    bytes: usize,
}

/// Run the collect command.
pub fn collect(ctx: &Context, dir: &Path) -> Result<()> {
    let config = ctx.load_config()?;
    let files = collect_project_files(dir, &config.collect_options())
        .with_context(|| format!("failed to collect files from {}", dir.display()))?;
    ctx.out
        .debug(format!("{} file(s) under {}", files.len(), dir.display()));

    let entries: Vec<CollectedFile> = files
        .iter()
        .map(|f| CollectedFile {
            path: &f.path,
            bytes: f.content.len(),
        })
        .collect();

    ctx.out.result(&entries, |entries| {
        if entries.is_empty() {
            return vec!["No files collected.".to_string()];
        }
        entries.iter().map(|e| e.path.to_string()).collect()
    })?;
    Ok(())
}
