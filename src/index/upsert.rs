//! Namespace bookkeeping and chunk/vector inserts.
use rusqlite::{OptionalExtension, Result, params};

use super::{VectorStore, serialize_vector};
use crate::extract::{Chunk, ChunkKind};

fn kind_str(kind: ChunkKind) -> &'static str {
    match kind {
        ChunkKind::Text => "text",
        ChunkKind::Table => "table",
        ChunkKind::OcrText => "ocr_text",
    }
}

impl VectorStore {
    /// Whether the namespace for this content hash already holds vectors.
    pub fn namespace_exists(&self, content_hash: &str) -> Result<bool> {
        let count = self.vector_count(content_hash)?;
        Ok(count > 0)
    }

    /// Number of vectors stored under a namespace.
    pub fn vector_count(&self, content_hash: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM chunks c
            JOIN namespaces n ON c.namespace_id = n.id
            WHERE n.content_hash = ?
            "#,
            params![content_hash],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Insert the namespace row if missing and return its stable id.
    pub fn ensure_namespace(&self, content_hash: &str, source: &str) -> Result<i64> {
        if let Some(id) = self
            .conn
            .query_row(
                "SELECT id FROM namespaces WHERE content_hash = ?",
                params![content_hash],
                |row| row.get(0),
            )
            .optional()?
        {
            return Ok(id);
        }

        self.conn.execute(
            "INSERT INTO namespaces (content_hash, source) VALUES (?, ?)",
            params![content_hash, source],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert one batch of chunks with their embeddings, transactionally.
    ///
    /// `chunks` and `embeddings` must be the same length; extra entries on
    /// either side are ignored. A failed batch rolls back only itself; the
    /// caller decides whether to continue with the remaining batches.
    pub fn upsert_batch(
        &mut self,
        namespace_id: i64,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        debug_assert_eq!(chunks.len(), embeddings.len());

        let tx = self.conn.transaction()?;

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            tx.execute(
                r#"
                INSERT INTO chunks (namespace_id, kind, page_number, row_index, text, table_text)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
                params![
                    namespace_id,
                    kind_str(chunk.kind),
                    chunk.page_number as i64,
                    chunk.row_index.map(|i| i as i64),
                    chunk.text,
                    chunk.table_text,
                ],
            )?;
            let chunk_id = tx.last_insert_rowid();

            let vector_blob = serialize_vector(embedding);
            tx.execute(
                "INSERT INTO vec_chunks (rowid, embedding) VALUES (?, ?)",
                params![chunk_id, vector_blob],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}
