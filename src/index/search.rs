//! Similarity search scoped to a single namespace.
use rusqlite::{Result, params};

use super::{VectorStore, serialize_vector};

/// One match returned by a similarity query.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub text: String,
    pub table_text: String,
    pub page_number: u32,
    pub similarity: f64,
}

impl VectorStore {
    /// Return the `top_k` nearest chunks to the query vector within the
    /// namespace identified by `content_hash`.
    ///
    /// Cosine distance from sqlite-vec ranges over [0, 2]; it is mapped to a
    /// similarity in [0, 1] where 1 means identical direction.
    pub fn search(
        &self,
        content_hash: &str,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let query_blob = serialize_vector(query_vector);

        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                c.text,
                c.table_text,
                c.page_number,
                vec_distance_cosine(v.embedding, ?) AS distance
            FROM vec_chunks v
            JOIN chunks c ON v.rowid = c.id
            JOIN namespaces n ON c.namespace_id = n.id
            WHERE n.content_hash = ?
            ORDER BY distance ASC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(
            params![query_blob, content_hash, top_k as i64],
            |row| {
                let distance: f64 = row.get(3)?;
                Ok(RetrievedChunk {
                    text: row.get(0)?,
                    table_text: row.get(1)?,
                    page_number: row.get::<_, i64>(2)? as u32,
                    similarity: 1.0 - distance / 2.0,
                })
            },
        )?;

        rows.collect()
    }
}
