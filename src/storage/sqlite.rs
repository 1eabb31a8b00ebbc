//! SQLite link store implementation
//!
//! Records are written into a `.partial` sibling inside one transaction; the
//! file is renamed over the destination only on commit.

use crate::storage::schema::{initialize_schema, INSERT_LINK_SQL};
use crate::storage::traits::{LinkHandle, LinkSink, StorageError, StorageResult};
use crate::storage::partial_path;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use url::Url;

/// [`LinkSink`] producing SQLite databases
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteLinkSink;

impl SqliteLinkSink {
    pub fn new() -> Self {
        Self
    }
}

impl LinkSink for SqliteLinkSink {
    fn open(&self, destination: &Path) -> StorageResult<Box<dyn LinkHandle>> {
        Ok(Box::new(SqliteLinkHandle::create(destination)?))
    }
}

/// An open SQLite link store
pub struct SqliteLinkHandle {
    conn: Option<Connection>,
    partial: PathBuf,
    destination: PathBuf,
    written: u64,
}

impl SqliteLinkHandle {
    /// Creates an empty store next to `destination` and opens a transaction
    pub fn create(destination: &Path) -> StorageResult<Self> {
        let partial = partial_path(destination)?;
        if partial.exists() {
            tracing::debug!("Removing stale {}", partial.display());
            std::fs::remove_file(&partial)?;
        }

        let conn = Connection::open(&partial)?;
        initialize_schema(&conn)?;
        conn.execute_batch("BEGIN IMMEDIATE;")?;

        Ok(Self {
            conn: Some(conn),
            partial,
            destination: destination.to_path_buf(),
            written: 0,
        })
    }

    fn conn(&self) -> StorageResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| StorageError::Database("Link store already closed".to_string()))
    }
}

impl LinkHandle for SqliteLinkHandle {
    fn write(&mut self, url: &Url) -> StorageResult<()> {
        let mut stmt = self.conn()?.prepare_cached(INSERT_LINK_SQL)?;
        stmt.execute(params![url.as_str()])?;
        drop(stmt);

        self.written += 1;
        tracing::debug!("Stored {}", url);
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> StorageResult<u64> {
        let conn = self
            .conn
            .take()
            .ok_or_else(|| StorageError::Database("Link store already closed".to_string()))?;

        conn.execute_batch("COMMIT;")?;
        conn.close().map_err(|(_, e)| StorageError::Sqlite(e))?;

        std::fs::rename(&self.partial, &self.destination)?;
        tracing::info!(
            "Wrote {} links to {}",
            self.written,
            self.destination.display()
        );

        Ok(self.written)
    }
}

impl Drop for SqliteLinkHandle {
    fn drop(&mut self) {
        // Uncommitted: discard the partial store
        if let Some(conn) = self.conn.take() {
            drop(conn);
            if let Err(e) = std::fs::remove_file(&self.partial) {
                tracing::warn!("Failed to remove {}: {}", self.partial.display(), e);
            }
        }
    }
}
