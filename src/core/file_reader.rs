//! Page reading policy
//!
//! Pages are rewritten after enhancement, so content is never truncated or
//! lossily converted: an oversized or non-UTF-8 page is rejected instead.

use std::fs;
use std::path::Path;

use crate::core::error::PageError;

/// Default maximum page size in bytes (64 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Configuration for page reading
#[derive(Debug, Clone, Copy)]
pub struct FileReadConfig {
    /// Maximum file size to process (bytes)
    pub max_file_size: u64,
}

impl Default for FileReadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Read a page as UTF-8 text, enforcing the size limit
pub fn read_page(path: &Path, config: &FileReadConfig) -> Result<String, PageError> {
    let metadata = fs::metadata(path).map_err(|source| PageError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.len() > config.max_file_size {
        return Err(PageError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: config.max_file_size,
        });
    }

    let bytes = fs::read(path).map_err(|source| PageError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|e| PageError::NotUtf8 {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })
}

/// Write a page, creating parent directories as needed
pub fn write_page(path: &Path, content: &str) -> Result<(), PageError> {
    let to_error = |source| PageError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(to_error)?;
        }
    }
    fs::write(path, content).map_err(to_error)
}
