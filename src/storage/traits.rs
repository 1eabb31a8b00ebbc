//! Storage traits and error types
//!
//! This module defines the trait interface for link store backends and
//! associated error types.

use std::path::Path;
use thiserror::Error;
use url::Url;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Opens link stores at a destination
///
/// A store opened here replaces whatever was at the destination, but only
/// once [`LinkHandle::commit`] succeeds.
pub trait LinkSink: Send + Sync {
    /// Opens a fresh, empty store for `destination`
    fn open(&self, destination: &Path) -> StorageResult<Box<dyn LinkHandle>>;
}

/// An open link store being written
pub trait LinkHandle: Send {
    /// Appends one link record
    fn write(&mut self, url: &Url) -> StorageResult<()>;

    /// Makes every write durable at the destination and returns the count
    ///
    /// Dropping a handle without committing discards its writes.
    fn commit(self: Box<Self>) -> StorageResult<u64>;
}
