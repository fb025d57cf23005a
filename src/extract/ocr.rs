//! OCR fallback for scanned PDFs.
//!
//! Pages are rendered to images with `pdftoppm` and recognized with
//! `tesseract`, both invoked as subprocesses. Pages of one document are
//! processed in parallel on a bounded worker pool; results are joined once
//! every page completes.
use std::path::Path;
use std::process::Command;

use lopdf::Document;
use rayon::prelude::*;
use tracing::debug;

use super::{Chunk, ChunkKind, ExtractError, clean_text};

/// Recognized content of one rendered page.
#[derive(Debug, Clone, Default)]
pub struct OcrPage {
    pub text: String,
    /// Individual recognized words, used to reconstruct a pseudo-table row.
    pub words: Vec<String>,
}

/// Interface to an OCR engine, one call per page.
pub trait OcrEngine: Send + Sync {
    fn ocr_page(&self, pdf: &Path, page_number: u32) -> Result<OcrPage, ExtractError>;
}

/// OCR via the poppler + tesseract command line tools.
pub struct TesseractOcr {
    pub dpi: u32,
    pub language: String,
}

impl TesseractOcr {
    pub fn new(dpi: u32, language: impl Into<String>) -> Self {
        Self {
            dpi,
            language: language.into(),
        }
    }

    fn render_page(&self, pdf: &Path, page_number: u32, out_dir: &Path) -> Result<std::path::PathBuf, ExtractError> {
        let prefix = out_dir.join("page");
        let status = Command::new("pdftoppm")
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg("-singlefile")
            .arg(pdf)
            .arg(&prefix)
            .status()
            .map_err(|e| ExtractError::Ocr(format!("pdftoppm: {e}")))?;
        if !status.success() {
            return Err(ExtractError::Ocr(format!(
                "pdftoppm exited with {status} for page {page_number}"
            )));
        }
        Ok(prefix.with_extension("png"))
    }

    fn run_tesseract(&self, image: &Path, tsv: bool) -> Result<String, ExtractError> {
        let mut cmd = Command::new("tesseract");
        cmd.arg(image).arg("-").arg("-l").arg(&self.language);
        if tsv {
            cmd.arg("tsv");
        }
        let output = cmd
            .output()
            .map_err(|e| ExtractError::Ocr(format!("tesseract: {e}")))?;
        if !output.status.success() {
            return Err(ExtractError::Ocr(format!(
                "tesseract exited with {}",
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractOcr {
    fn ocr_page(&self, pdf: &Path, page_number: u32) -> Result<OcrPage, ExtractError> {
        let scratch = tempfile::tempdir()?;
        let image = self.render_page(pdf, page_number, scratch.path())?;

        let text = self.run_tesseract(&image, false)?;
        let tsv = self.run_tesseract(&image, true)?;

        Ok(OcrPage {
            text,
            words: parse_tsv_words(&tsv),
        })
    }
}

/// Pull the recognized word column out of tesseract's TSV output.
fn parse_tsv_words(tsv: &str) -> Vec<String> {
    tsv.lines()
        .skip(1) // header row
        .filter_map(|line| line.split('\t').nth(11))
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// OCR every page of a scanned PDF on a bounded worker pool and flatten the
/// per-page chunks.
///
/// A failing page fails the document; the caller converts that into a
/// logged skip.
pub fn extract_scanned(
    path: &Path,
    source: &str,
    engine: &dyn OcrEngine,
    workers: usize,
) -> Result<Vec<Chunk>, ExtractError> {
    let doc = Document::load(path)?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    drop(doc);

    debug!(
        "OCR of {} pages from {source} on {workers} workers",
        page_numbers.len()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| ExtractError::Ocr(e.to_string()))?;

    let per_page: Vec<Vec<Chunk>> = pool.install(|| {
        page_numbers
            .par_iter()
            .map(|&page_number| {
                let page = engine.ocr_page(path, page_number)?;
                Ok(page_chunks(source, page_number, &page))
            })
            .collect::<Result<_, ExtractError>>()
    })?;

    Ok(per_page.into_iter().flatten().collect())
}

/// Build the chunks for one OCRed page: a text chunk when anything was
/// recognized, plus a pseudo-table row concatenating the words.
fn page_chunks(source: &str, page_number: u32, page: &OcrPage) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    let text = clean_text(&page.text);
    if !text.is_empty() {
        chunks.push(Chunk {
            source: source.to_string(),
            page_number,
            row_index: None,
            kind: ChunkKind::OcrText,
            text,
            table_text: String::new(),
        });
    }

    if !page.words.is_empty() {
        chunks.push(Chunk {
            source: source.to_string(),
            page_number,
            row_index: Some(0),
            kind: ChunkKind::Table,
            text: String::new(),
            table_text: clean_text(&page.words.join(" | ")),
        });
    }

    chunks
}
