//! Ingestion front door: hashing, dedup, embedding, and batched upserts.
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::VectorStore;
use crate::embedder::Embedder;
use crate::extract::Chunk;

/// SHA-256 of the document's raw bytes, hex encoded. This is the canonical
/// namespace key: the same file always lands in the same namespace.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Outcome of an indexing request.
#[derive(Debug, PartialEq, Eq)]
pub enum IndexOutcome {
    /// Chunks were embedded and stored. `batches_failed` counts upsert
    /// batches that errored and were skipped.
    Indexed {
        chunks: usize,
        batches_failed: usize,
    },
    /// The document was already indexed; nothing was written.
    Skipped,
    /// Extraction produced no usable chunks.
    NoContent,
}

/// Orchestrates indexing a document's chunks into the vector store.
pub struct IndexGateway<'a> {
    store: &'a mut VectorStore,
    embedder: &'a dyn Embedder,
    batch_size: usize,
}

impl<'a> IndexGateway<'a> {
    pub fn new(store: &'a mut VectorStore, embedder: &'a dyn Embedder, batch_size: usize) -> Self {
        Self {
            store,
            embedder,
            batch_size: batch_size.max(1),
        }
    }

    /// Index a document under the namespace derived from its raw bytes.
    ///
    /// If the namespace already holds vectors the document is skipped
    /// entirely. Individual batch failures are logged and counted but do not
    /// abort the remaining batches.
    pub fn index_document(
        &mut self,
        bytes: &[u8],
        source: &str,
        chunks: &[Chunk],
    ) -> Result<(String, IndexOutcome)> {
        let hash = content_hash(bytes);

        if self
            .store
            .namespace_exists(&hash)
            .context("checking for existing namespace")?
        {
            info!("Document already indexed, skipping: {source}");
            return Ok((hash, IndexOutcome::Skipped));
        }

        let chunks: Vec<&Chunk> = chunks.iter().filter(|c| !c.is_empty()).collect();
        if chunks.is_empty() {
            warn!("No usable content extracted from {source}");
            return Ok((hash, IndexOutcome::NoContent));
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.embedding_text()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .context("embedding document chunks")?;

        let namespace_id = self
            .store
            .ensure_namespace(&hash, source)
            .context("creating namespace")?;

        let bar = ProgressBar::new(chunks.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(format!("Indexing {source}"));

        let mut batches_failed = 0;
        for (chunk_batch, embedding_batch) in chunks
            .chunks(self.batch_size)
            .zip(embeddings.chunks(self.batch_size))
        {
            let owned: Vec<Chunk> = chunk_batch.iter().map(|c| (*c).clone()).collect();
            match self
                .store
                .upsert_batch(namespace_id, &owned, embedding_batch)
            {
                Ok(()) => bar.inc(chunk_batch.len() as u64),
                Err(e) => {
                    warn!("Upsert batch failed, continuing: {e}");
                    batches_failed += 1;
                }
            }
        }
        bar.finish_and_clear();

        info!(
            "Indexed {} chunks from {source} ({batches_failed} batches failed)",
            chunks.len()
        );
        Ok((
            hash,
            IndexOutcome::Indexed {
                chunks: chunks.len(),
                batches_failed,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::hash::HashEmbedder;
    use crate::extract::ChunkKind;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            source: "doc.pdf".to_string(),
            page_number: 1,
            row_index: None,
            kind: ChunkKind::Text,
            text: text.to_string(),
            table_text: String::new(),
        }
    }

    #[test]
    fn test_content_hash_is_stable_hex_sha256() {
        let a = content_hash(b"hello");
        let b = content_hash(b"hello");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(
            a,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_ne!(content_hash(b"world"), a);
    }

    #[test]
    fn test_index_then_skip_on_reindex() {
        let mut store = VectorStore::open_in_memory().unwrap();
        let embedder = HashEmbedder::default();
        let chunks = vec![chunk("rent 1200"), chunk("salary 5000")];

        let mut gateway = IndexGateway::new(&mut store, &embedder, 100);
        let (hash, outcome) = gateway
            .index_document(b"pdf bytes", "doc.pdf", &chunks)
            .unwrap();
        assert_eq!(
            outcome,
            IndexOutcome::Indexed {
                chunks: 2,
                batches_failed: 0
            }
        );
        assert_eq!(store.vector_count(&hash).unwrap(), 2);

        let mut gateway = IndexGateway::new(&mut store, &embedder, 100);
        let (hash2, outcome) = gateway
            .index_document(b"pdf bytes", "doc.pdf", &chunks)
            .unwrap();
        assert_eq!(hash2, hash);
        assert_eq!(outcome, IndexOutcome::Skipped);
        assert_eq!(store.vector_count(&hash).unwrap(), 2, "no new vectors");
    }

    #[test]
    fn test_empty_chunks_are_filtered() {
        let mut store = VectorStore::open_in_memory().unwrap();
        let embedder = HashEmbedder::default();
        let chunks = vec![chunk(""), chunk(""), chunk("real content")];

        let mut gateway = IndexGateway::new(&mut store, &embedder, 100);
        let (hash, outcome) = gateway
            .index_document(b"bytes", "doc.pdf", &chunks)
            .unwrap();
        assert_eq!(
            outcome,
            IndexOutcome::Indexed {
                chunks: 1,
                batches_failed: 0
            }
        );
        assert_eq!(store.vector_count(&hash).unwrap(), 1);
    }

    #[test]
    fn test_no_content() {
        let mut store = VectorStore::open_in_memory().unwrap();
        let embedder = HashEmbedder::default();

        let mut gateway = IndexGateway::new(&mut store, &embedder, 100);
        let (hash, outcome) = gateway.index_document(b"scan", "scan.pdf", &[]).unwrap();
        assert_eq!(outcome, IndexOutcome::NoContent);
        assert!(!store.namespace_exists(&hash).unwrap());
    }

    #[test]
    fn test_small_batch_size_splits_upserts() {
        let mut store = VectorStore::open_in_memory().unwrap();
        let embedder = HashEmbedder::default();
        let chunks: Vec<Chunk> = (0..5).map(|i| chunk(&format!("line {i}"))).collect();

        let mut gateway = IndexGateway::new(&mut store, &embedder, 2);
        let (hash, outcome) = gateway.index_document(b"doc", "doc.pdf", &chunks).unwrap();
        assert_eq!(
            outcome,
            IndexOutcome::Indexed {
                chunks: 5,
                batches_failed: 0
            }
        );
        assert_eq!(store.vector_count(&hash).unwrap(), 5);
    }
}
