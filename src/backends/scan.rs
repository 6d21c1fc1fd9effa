//! Page discovery backend
//!
//! Walks a directory with the ignore crate and keeps rendered HTML pages.

use anyhow::{bail, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::model::{Meta, ResultItem, ResultSet};
use crate::core::paths::{display_path, is_page, resolve};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::util::{get_file_size, get_mtime_ms};

/// How a directory walk treats hidden and ignored entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    pub max_depth: Option<usize>,
    /// Include dotfiles and dot-directories
    pub hidden: bool,
    /// Honor .gitignore and friends
    pub ignore: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            hidden: false,
            ignore: true,
        }
    }
}

/// Every page below `dir`, sorted
pub fn find_pages(dir: &Path, walk: WalkOptions) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(dir);
    builder
        .hidden(!walk.hidden)
        .git_ignore(walk.ignore)
        .git_global(walk.ignore)
        .git_exclude(walk.ignore)
        .ignore(walk.ignore)
        .parents(walk.ignore)
        .require_git(false);

    if let Some(depth) = walk.max_depth {
        builder.max_depth(Some(depth));
    }

    let mut pages = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(%err, "skipping unreadable entry");
                continue;
            }
        };

        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && is_page(entry.path()) {
            pages.push(entry.into_path());
        }
    }

    pages.sort();
    debug!(dir = %dir.display(), count = pages.len(), "pages found");
    pages
}

/// Scan pages under root (or a scope below it)
pub fn scan_pages(root: &Path, scope: Option<&Path>, walk: WalkOptions) -> Result<ResultSet> {
    let scan_path = match scope {
        Some(scope) => resolve(root, scope),
        None => root.to_path_buf(),
    };
    if !scan_path.is_dir() {
        bail!("scan scope is not a directory: {}", scan_path.display());
    }

    let mut result_set: ResultSet = find_pages(&scan_path, walk)
        .into_iter()
        .map(|path| {
            let meta = Meta {
                size: get_file_size(&path).ok(),
                mtime_ms: get_mtime_ms(&path).ok(),
                ..Meta::default()
            };
            ResultItem::file(display_path(&path, root)).with_meta(meta)
        })
        .collect();

    result_set.sort();
    Ok(result_set)
}

/// Run the scan command
pub fn run_scan(
    root: &Path,
    scope: Option<&Path>,
    walk: WalkOptions,
    render_config: RenderConfig,
) -> Result<()> {
    let result_set = scan_pages(root, scope, walk)?;

    let renderer = Renderer::with_config(render_config);
    println!("{}", renderer.render(&result_set));

    Ok(())
}
