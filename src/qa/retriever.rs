//! Query-time retrieval against one document namespace.
use anyhow::{Context, Result};
use tracing::debug;

use crate::embedder::Embedder;
use crate::index::VectorStore;
use crate::index::search::RetrievedChunk;

/// Embed the question and return its `top_k` nearest chunks from the
/// document's namespace. Chunks with no content in either field are dropped.
pub fn retrieve_top_chunks(
    store: &VectorStore,
    embedder: &dyn Embedder,
    content_hash: &str,
    question: &str,
    top_k: usize,
) -> Result<Vec<RetrievedChunk>> {
    let query_vector = embedder.embed(question).context("embedding question")?;

    let mut chunks = store
        .search(content_hash, &query_vector, top_k)
        .context("querying vector index")?;

    chunks.retain(|c| !(c.text.is_empty() && c.table_text.is_empty()));
    debug!("Retrieved {} chunks for question", chunks.len());

    Ok(chunks)
}
