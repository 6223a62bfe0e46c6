use crate::database::VectorDatabase;
use crate::embedder::Embedder;
use crate::error::{EmbedError, PipelineError, Result};
use crate::models::SearchHit;
use tracing::debug;

impl VectorDatabase {
    /// Embed the query as a single-item batch, take the `k` nearest index
    /// rows, and resolve each row id back to its flattened metadata chunk.
    ///
    /// The score is `1 - distance/2`, which maps squared L2 distance over
    /// unit-normalized embeddings onto cosine similarity. Ids outside the
    /// metadata range (stale index rows) are skipped, not errors.
    pub fn search<E: Embedder>(
        &self,
        embedder: &E,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        let vectors = embedder.encode(&[query.to_string()])?;
        let query_vector = vectors.into_iter().next().ok_or(PipelineError::Embed(
            EmbedError::CountMismatch {
                expected: 1,
                got: 0,
            },
        ))?;

        let neighbors = self.index().search(&query_vector, k)?;
        let flattened = self.metadata().flattened();

        let mut hits = Vec::with_capacity(neighbors.len());
        for (distance, id) in neighbors {
            let Some(chunk) = flattened.get(id) else {
                debug!(id, "index row has no metadata chunk, skipping");
                continue;
            };
            hits.push(SearchHit {
                text: chunk.text.clone(),
                pdf_path: chunk.pdf_path.clone(),
                page_number: chunk.page_number,
                score: 1.0 - distance / 2.0,
            });
        }

        Ok(hits)
    }
}
