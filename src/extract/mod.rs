//! PDF content extraction.
//!
//! A document is split into per-page chunks. Pages with extractable text are
//! handled directly ([`pdf`]); documents with no extractable text on any page
//! are rendered and OCRed page-by-page in parallel ([`ocr`]).
use std::path::Path;

use thiserror::Error;
use tracing::{error, info};

pub mod ocr;
pub mod pdf;

use ocr::OcrEngine;

/// Where a chunk's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Text,
    Table,
    OcrText,
}

/// A unit of extracted document content plus location metadata.
///
/// Invariant: at least one of `text`/`table_text` is non-empty. Chunks
/// violating this are never emitted by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub source: String,
    pub page_number: u32,
    /// Set for table rows; `None` for page-level text.
    pub row_index: Option<usize>,
    pub kind: ChunkKind,
    pub text: String,
    pub table_text: String,
}

impl Chunk {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.table_text.is_empty()
    }

    /// Content used for embedding, preferring table text over running text.
    pub fn embedding_text(&self) -> &str {
        if self.table_text.is_empty() {
            &self.text
        } else {
            &self.table_text
        }
    }
}

/// Errors raised during document extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("ocr failed: {0}")]
    Ocr(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Collapse all whitespace runs (including newlines) into single spaces.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract chunks from a PDF, falling back to OCR for scanned documents.
///
/// Whole-document failures are logged and yield an empty chunk list rather
/// than an error; an unreadable upload must not take down the session.
pub fn process_pdf(path: &Path, engine: &dyn OcrEngine, ocr_workers: usize) -> Vec<Chunk> {
    match extract_chunks(path, engine, ocr_workers) {
        Ok(chunks) => chunks,
        Err(e) => {
            error!("Failed to process {}: {e}", path.display());
            Vec::new()
        }
    }
}

fn extract_chunks(
    path: &Path,
    engine: &dyn OcrEngine,
    ocr_workers: usize,
) -> Result<Vec<Chunk>, ExtractError> {
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let text_chunks = pdf::extract_text_chunks(path, &source)?;
    if !text_chunks.is_empty() {
        return Ok(text_chunks);
    }

    info!("No extractable text in {source}, switching to OCR");
    ocr::extract_scanned(path, &source, engine, ocr_workers)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    /// Engine that records whether it was ever invoked and always fails.
    struct TrackingOcr {
        called: AtomicBool,
    }

    impl OcrEngine for TrackingOcr {
        fn ocr_page(&self, _pdf: &Path, _page_number: u32) -> Result<ocr::OcrPage, ExtractError> {
            self.called.store(true, Ordering::SeqCst);
            Err(ExtractError::Ocr("engine should not run".to_string()))
        }
    }

    #[test]
    fn test_text_pdf_never_reaches_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        pdf::tests::write_pdf(&path, "Total assets 42");

        let engine = TrackingOcr {
            called: AtomicBool::new(false),
        };
        let chunks = process_pdf(&path, &engine, 2);

        assert!(!chunks.is_empty());
        assert!(chunks.iter().any(|c| c.kind == ChunkKind::Text));
        assert!(
            !engine.called.load(Ordering::SeqCst),
            "OCR ran on a PDF with extractable text"
        );
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("a\nb\n\nc"), "a b c");
        assert_eq!(clean_text("  padded   out  "), "padded out");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_embedding_text_prefers_table() {
        let chunk = Chunk {
            source: "f.pdf".to_string(),
            page_number: 1,
            row_index: Some(0),
            kind: ChunkKind::Table,
            text: "running text".to_string(),
            table_text: "a | b | c".to_string(),
        };
        assert_eq!(chunk.embedding_text(), "a | b | c");

        let text_only = Chunk {
            table_text: String::new(),
            ..chunk
        };
        assert_eq!(text_only.embedding_text(), "running text");
    }
}
