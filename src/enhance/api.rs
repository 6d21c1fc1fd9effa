//! Page pipeline - read, enhance, write, report
//!
//! Each page is parsed into its own [`Document`](crate::dom::document::Document), enhanced,
//! serialized and compared with the source. Failures on one page become error
//! items; the batch carries on.

use anyhow::{Context, Result};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::backends::scan::{find_pages, WalkOptions};
use crate::core::error::PageError;
use crate::core::file_reader::{read_page, write_page, FileReadConfig};
use crate::core::model::{Meta, ResultItem, ResultSet};
use crate::core::paths::{display_path, output_path, resolve};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::util::{get_file_size, get_mtime_ms, hash_bytes};
use crate::dom::parse;
use crate::enhance::menu::collect_menu;
use crate::enhance::{enhance_page, EnhanceConfig, EnhanceOptions, EnhanceReport};

/// Where enhanced pages go
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Report only
    #[default]
    DryRun,
    /// Overwrite pages that changed
    InPlace,
    /// Mirror every page below this directory
    OutDir(PathBuf),
}

/// Everything the pipeline needs besides the pages themselves
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    pub config: EnhanceConfig,
    pub options: EnhanceOptions,
    pub read: FileReadConfig,
    pub write: WriteMode,
}

/// Enhance an HTML string, returning the new markup and what changed
pub fn enhance_source(
    html: &str,
    config: &EnhanceConfig,
    options: EnhanceOptions,
) -> (String, EnhanceReport) {
    let mut doc = parse(html);
    let report = enhance_page(&mut doc, config, options);
    (doc.to_html(), report)
}

/// Enhance one page on disk. Never fails; problems are reported as error items.
pub fn enhance_file(root: &Path, path: &Path, settings: &PipelineSettings) -> ResultItem {
    let shown = display_path(path, root);
    match process_page(root, path, &shown, settings) {
        Ok(item) => item,
        Err(err) => {
            warn!(path = %shown, code = err.code(), "{}", err);
            err.to_result_item(shown)
        }
    }
}

fn process_page(
    root: &Path,
    path: &Path,
    shown: &str,
    settings: &PipelineSettings,
) -> Result<ResultItem, PageError> {
    let source = read_page(path, &settings.read)?;
    let meta_before = Meta {
        size: get_file_size(path).ok(),
        mtime_ms: get_mtime_ms(path).ok(),
        ..Meta::default()
    };

    let (output, report) = enhance_source(&source, &settings.config, settings.options);
    let hash = hash_bytes(source.as_bytes());
    let output_hash = hash_bytes(output.as_bytes());
    let changed = hash != output_hash;

    let target = match &settings.write {
        WriteMode::DryRun => None,
        WriteMode::InPlace => changed.then(|| path.to_path_buf()),
        WriteMode::OutDir(dir) => Some(output_path(path, root, dir)),
    };
    if let Some(target) = &target {
        write_page(target, &output)?;
        info!(path = %shown, target = %target.display(), "page written");
    } else {
        debug!(path = %shown, changed, "page not written");
    }

    let meta = Meta {
        hash: Some(hash),
        output_hash: Some(output_hash),
        changed,
        written: target.is_some(),
        ..meta_before
    };

    let mut item = ResultItem::page(shown)
        .with_excerpt(report.summary())
        .with_meta(meta);
    if let Ok(data) = serde_json::to_value(&report) {
        item = item.with_data(data);
    }
    Ok(item)
}

/// Expand the requested paths into a sorted, deduplicated page list.
///
/// Directories are walked for pages; files are taken as given so a missing or
/// misnamed file is still reported. No paths means the whole root.
pub fn collect_pages(root: &Path, paths: &[PathBuf], walk: WalkOptions) -> Vec<PathBuf> {
    let mut pages = Vec::new();

    if paths.is_empty() {
        pages.extend(find_pages(root, walk));
    }
    for path in paths {
        let resolved = resolve(root, path);
        if resolved.is_dir() {
            pages.extend(find_pages(&resolved, walk));
        } else {
            pages.push(resolved);
        }
    }

    pages.sort();
    pages.dedup();
    pages
}

/// Drop pages that live under the output directory, so a previous run's
/// output is never read back as input
pub fn exclude_output(pages: Vec<PathBuf>, write: &WriteMode) -> Vec<PathBuf> {
    let WriteMode::OutDir(dir) = write else {
        return pages;
    };
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.clone());
    let (kept, skipped): (Vec<_>, Vec<_>) =
        pages.into_iter().partition(|page| !page.starts_with(&dir));
    if !skipped.is_empty() {
        debug!(
            count = skipped.len(),
            out_dir = %dir.display(),
            "skipping pages under output directory"
        );
    }
    kept
}

/// Enhance a batch of pages
pub fn enhance_pages(root: &Path, pages: &[PathBuf], settings: &PipelineSettings) -> ResultSet {
    #[cfg(feature = "parallel")]
    let items: Vec<ResultItem> = pages
        .par_iter()
        .map(|page| enhance_file(root, page, settings))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let items: Vec<ResultItem> = pages
        .iter()
        .map(|page| enhance_file(root, page, settings))
        .collect();

    let mut result_set = ResultSet::from_iter(items);
    result_set.sort();
    result_set
}

/// Run the enhance command; returns whether any page changed
pub fn run_enhance(
    root: &Path,
    paths: &[PathBuf],
    walk: WalkOptions,
    settings: &PipelineSettings,
    render_config: RenderConfig,
) -> Result<bool> {
    let pages = exclude_output(collect_pages(root, paths, walk), &settings.write);
    info!(count = pages.len(), mode = ?settings.write, "enhancing pages");

    let result_set = enhance_pages(root, &pages, settings);
    let changed = result_set.any_changed();

    let renderer = Renderer::with_config(render_config);
    println!("{}", renderer.render(&result_set));

    Ok(changed)
}

/// Menu entries of one page, as result items in document order
pub fn menu_items(root: &Path, path: &Path, settings: &PipelineSettings) -> ResultSet {
    let shown = display_path(path, root);
    let source = match read_page(path, &settings.read) {
        Ok(source) => source,
        Err(err) => {
            warn!(path = %shown, code = err.code(), "{}", err);
            return ResultSet::from_iter([err.to_result_item(shown)]);
        }
    };

    let doc = parse(&source);
    collect_menu(&doc, &settings.config)
        .into_iter()
        .map(|entry| {
            let item = ResultItem::menu(shown.as_str(), entry.label.as_str());
            match serde_json::to_value(&entry) {
                Ok(data) => item.with_data(data),
                Err(_) => item,
            }
        })
        .collect()
}

/// Run the menu command
pub fn run_menu(
    root: &Path,
    file: &Path,
    settings: &PipelineSettings,
    render_config: RenderConfig,
) -> Result<()> {
    let path = resolve(root, file);
    let result_set = menu_items(root, &path, settings);

    let renderer = Renderer::with_config(render_config);
    println!("{}", renderer.render(&result_set));

    Ok(())
}

/// Run the render command: the enhanced page goes to stdout unchanged
pub fn run_render(root: &Path, file: &Path, settings: &PipelineSettings) -> Result<()> {
    let path = resolve(root, file);
    let source = read_page(&path, &settings.read)
        .with_context(|| format!("failed to render {}", display_path(&path, root)))?;

    let (output, report) = enhance_source(&source, &settings.config, settings.options);
    debug!(summary = %report.summary(), "page rendered");
    print!("{}", output);

    Ok(())
}
