//! # finassist — personal finance assistant pipeline
//!
//! Analyzes CSV transaction exports and answers questions over uploaded
//! financial PDFs via retrieval-augmented generation against a local
//! vector index.
//!
//! ## Architecture
//!
//! - **[`config`]** — Configuration loading, validation, and defaults
//! - **[`ledger`]** — CSV transaction import, keyword categorization, monthly expense forecasting
//! - **[`extract`]** — Per-page PDF text/table extraction with parallel OCR fallback
//! - **[`embedder`]** — Text embedding trait (remote HTTP service + deterministic test embedder)
//! - **[`index`]** — SQLite + sqlite-vec vector store with content-hash namespaces
//! - **[`qa`]** — Top-K retrieval, prompt assembly, and chat-completion answering

pub mod config;
pub mod embedder;
pub mod extract;
pub mod index;
pub mod ledger;
pub mod qa;
