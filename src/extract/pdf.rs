//! Direct text and table extraction for text-based PDFs.
use std::path::Path;
use std::sync::LazyLock;

use lopdf::Document;
use regex::Regex;

use super::{Chunk, ChunkKind, ExtractError, clean_text};

/// Two or more spaces, or a tab, marks a column boundary.
static COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}|\t").unwrap());

/// Extract per-page text and table chunks from a text-based PDF.
///
/// Returns an empty vec when no page yields any text, which signals the
/// caller to fall back to OCR.
pub fn extract_text_chunks(path: &Path, source: &str) -> Result<Vec<Chunk>, ExtractError> {
    let doc = Document::load(path)?;
    let mut chunks = Vec::new();

    for &page_number in doc.get_pages().keys() {
        // A page that fails text extraction is treated as a non-text page,
        // not a document failure.
        let raw = doc.extract_text(&[page_number]).unwrap_or_default();
        if raw.trim().is_empty() {
            continue;
        }

        let text = clean_text(&raw);
        if !text.is_empty() {
            chunks.push(Chunk {
                source: source.to_string(),
                page_number,
                row_index: None,
                kind: ChunkKind::Text,
                text,
                table_text: String::new(),
            });
        }

        for (row_index, row_text) in table_rows(&raw).into_iter().enumerate() {
            chunks.push(Chunk {
                source: source.to_string(),
                page_number,
                row_index: Some(row_index),
                kind: ChunkKind::Table,
                text: String::new(),
                table_text: row_text,
            });
        }
    }

    Ok(chunks)
}

/// Reconstruct table rows from page text using a column-gap heuristic.
///
/// A line that splits into two or more cells on wide gaps or tabs is taken
/// as a table row; its cells are joined with `" | "`.
pub fn table_rows(page_text: &str) -> Vec<String> {
    let mut rows = Vec::new();
    for line in page_text.lines() {
        let cells: Vec<&str> = COLUMN_RE
            .split(line)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        if cells.len() >= 2 {
            rows.push(clean_text(&cells.join(" | ")));
        }
    }
    rows
}
