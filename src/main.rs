//! docenhance - Post-process rendered documentation pages
//!
//! docenhance provides:
//! - Side navigation menus built from section headings
//! - Self-links on every heading that carries an id
//! - A tolerant HTML tree that reproduces untouched markup byte for byte
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod backends;
mod cli;
mod core;
mod dom;
mod enhance;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
