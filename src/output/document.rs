//! File-backed document writer
//!
//! Documents are rendered without a namespace; this writer adds the root
//! `xmlns` while copying events, prefixes a UTF-8 BOM, and stages the bytes
//! in a `.partial` sibling before renaming over the destination.

use crate::output::traits::{DocumentWriter, OutputError, OutputResult};
use crate::storage::partial_path;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use std::io::Write;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// [`DocumentWriter`] writing to the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDocumentWriter;

impl FileDocumentWriter {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentWriter for FileDocumentWriter {
    fn write_document(
        &self,
        document: &str,
        namespace: &str,
        destination: &Path,
    ) -> OutputResult<()> {
        let body = inject_namespace(document, namespace)?;
        let partial = partial_path(destination)?;

        let result = write_file(&partial, &body)
            .and_then(|()| std::fs::rename(&partial, destination).map_err(OutputError::from));

        if result.is_err() && partial.exists() {
            if let Err(e) = std::fs::remove_file(&partial) {
                tracing::warn!("Failed to remove {}: {}", partial.display(), e);
            }
        }
        result?;

        tracing::info!("Wrote {}", destination.display());
        Ok(())
    }
}

fn write_file(path: &Path, body: &[u8]) -> OutputResult<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(UTF8_BOM)?;
    file.write_all(body)?;
    file.sync_all()?;
    Ok(())
}

/// Copies the document, adding `xmlns` to the root start tag
pub fn inject_namespace(document: &str, namespace: &str) -> OutputResult<Vec<u8>> {
    let mut reader = Reader::from_str(document);
    let mut writer = Writer::new(Vec::new());
    let mut root_seen = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| OutputError::Format(e.to_string()))?;

        let event = match event {
            Event::Start(mut start) if !root_seen => {
                root_seen = true;
                start.push_attribute(("xmlns", namespace));
                Event::Start(start)
            }
            Event::Empty(mut start) if !root_seen => {
                root_seen = true;
                start.push_attribute(("xmlns", namespace));
                Event::Empty(start)
            }
            Event::Eof => break,
            other => other,
        };

        writer
            .write_event(event)
            .map_err(|e| OutputError::Format(e.to_string()))?;
    }

    if !root_seen {
        return Err(OutputError::Format("Document has no root element".to_string()));
    }

    Ok(writer.into_inner())
}
