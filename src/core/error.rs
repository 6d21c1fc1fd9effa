//! Typed errors for reading and writing pages
//!
//! Each variant carries a stable code so a failing page can be reported as an
//! error result item instead of aborting the whole batch.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::model::{ItemError, ResultItem};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} exceeds size limit ({size} > {limit} bytes)")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("{path} is not valid UTF-8 (invalid byte at offset {offset})")]
    NotUtf8 { path: PathBuf, offset: usize },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PageError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            PageError::Read { .. } => "READ_FAILED",
            PageError::TooLarge { .. } => "FILE_TOO_LARGE",
            PageError::NotUtf8 { .. } => "NOT_UTF8",
            PageError::Write { .. } => "WRITE_FAILED",
        }
    }

    /// Convert to an error result item attributed to `display_path`
    pub fn to_result_item(&self, display_path: impl Into<String>) -> ResultItem {
        ResultItem::error(ItemError::new(self.code(), self.to_string())).with_path(display_path)
    }
}
