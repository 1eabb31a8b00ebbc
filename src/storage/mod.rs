//! Storage module for persisting crawl results
//!
//! This module handles the link store output:
//! - SQLite database initialization and schema
//! - Transactional, replace-on-commit link writes

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{SqliteLinkHandle, SqliteLinkSink};
pub use traits::{LinkHandle, LinkSink, StorageError, StorageResult};

use std::path::{Path, PathBuf};

/// Returns the `.partial` sibling an artifact is staged in before commit
///
/// # Errors
///
/// Returns `StorageError::InvalidDestination` if the path has no file name.
pub fn partial_path(destination: &Path) -> StorageResult<PathBuf> {
    let file_name = destination
        .file_name()
        .ok_or_else(|| StorageError::InvalidDestination(destination.display().to_string()))?;

    let mut partial = file_name.to_os_string();
    partial.push(".partial");
    Ok(destination.with_file_name(partial))
}
