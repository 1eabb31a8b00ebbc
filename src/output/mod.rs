//! Output module for materializing crawl results
//!
//! This module handles:
//! - Selecting the pages eligible for output
//! - Rendering plain and keyworded sitemaps
//! - Writing the link store through a `LinkSink`

mod document;
pub mod sitemap;
mod traits;

pub use document::{inject_namespace, FileDocumentWriter};
pub use traits::{DocumentWriter, Materialized, OutputError, OutputResult};

use crate::config::OutputKind;
use crate::state::CrawlState;
use crate::storage::{LinkSink, SqliteLinkSink};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

/// Turns a finished crawl into its configured artifact
#[derive(Clone)]
pub struct OutputMaterializer {
    links: Arc<dyn LinkSink>,
    documents: Arc<dyn DocumentWriter>,
}

impl OutputMaterializer {
    pub fn new(links: Arc<dyn LinkSink>, documents: Arc<dyn DocumentWriter>) -> Self {
        Self { links, documents }
    }

    /// SQLite link stores and XML files on the local filesystem
    pub fn filesystem() -> Self {
        Self::new(Arc::new(SqliteLinkSink::new()), Arc::new(FileDocumentWriter::new()))
    }

    /// Materializes the eligible pages of `state` as `kind` at `destination`
    ///
    /// Eligible pages are visited, allowed, fetched successfully and not
    /// marked `noindex`.
    ///
    /// # Returns
    ///
    /// * `Materialized::Written` - The artifact was replaced
    /// * `Materialized::NothingToEmit` - A sitemap with no entries was skipped
    pub fn materialize(
        &self,
        state: &CrawlState,
        kind: OutputKind,
        destination: &Path,
    ) -> OutputResult<Materialized> {
        match kind {
            OutputKind::LinkStore => self.write_link_store(state, destination),
            OutputKind::Sitemap | OutputKind::KeywordedSitemap => {
                self.write_sitemap(state, kind, destination)
            }
        }
    }

    fn write_link_store(&self, state: &CrawlState, destination: &Path) -> OutputResult<Materialized> {
        let mut handle = self.links.open(destination)?;
        for url in state.eligible_urls() {
            handle.write(url)?;
        }
        let entries = handle.commit()?;

        Ok(Materialized::Written { entries })
    }

    fn write_sitemap(
        &self,
        state: &CrawlState,
        kind: OutputKind,
        destination: &Path,
    ) -> OutputResult<Materialized> {
        let lastmod = sitemap::lastmod_stamp(Utc::now());
        let entries = sitemap::build_entries(state, kind, &lastmod);

        if entries.is_empty() {
            tracing::info!(
                "No pages to emit for {}; {} not written",
                state.site_origin(),
                destination.display()
            );
            return Ok(Materialized::NothingToEmit);
        }

        let document = sitemap::render(&entries)?;
        self.documents
            .write_document(&document, sitemap::namespace_for(kind), destination)?;

        Ok(Materialized::Written {
            entries: entries.len() as u64,
        })
    }
}
