//! Output traits and types
//!
//! This module defines the document writer interface and the result of a
//! materialization.

use crate::storage::StorageError;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// What a materialization produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    /// An artifact was written with this many entries
    Written { entries: u64 },

    /// No eligible pages; nothing was written
    NothingToEmit,
}

/// Persists rendered XML documents
pub trait DocumentWriter: Send + Sync {
    /// Writes `document` to `destination` with `namespace` on its root element
    ///
    /// The destination is replaced atomically; a failed write leaves any
    /// previous file in place.
    fn write_document(&self, document: &str, namespace: &str, destination: &Path)
        -> OutputResult<()>;
}
