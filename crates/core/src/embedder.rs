use crate::error::{EmbedError, PipelineError};
use crate::parallel::map_ordered;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;

/// Batch embedding collaborator. Output vectors are expected to be
/// unit-normalized; the search score transform (`1 - distance/2`) relies on
/// that guarantee.
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

/// Deterministic character-trigram hashing embedder. Not a semantic model,
/// but it is fast, dependency-free and produces unit-norm vectors, which
/// keeps the whole pipeline exercisable offline.
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbedder {
    pub dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl HashingEmbedder {
    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimension.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

/// Group `texts` into fixed-size batches, embed them on a bounded pool, and
/// flatten the per-batch blocks back into one ordered sequence. Returns the
/// vectors together with the indices of the texts that were actually
/// embedded, so the caller can keep metadata in lockstep when a batch fails.
pub fn embed_in_batches<E: Embedder>(
    embedder: &E,
    texts: &[String],
    batch_size: usize,
    workers: usize,
) -> (Vec<Vec<f32>>, Vec<usize>) {
    let batch_size = batch_size.max(1);
    let batches: Vec<Vec<String>> = texts
        .chunks(batch_size)
        .map(|batch| batch.to_vec())
        .collect();

    let outcome = map_ordered(batches, workers, "embed", |_, batch| {
        let vectors = embedder.encode(&batch)?;
        if vectors.len() != batch.len() {
            return Err(PipelineError::Embed(EmbedError::CountMismatch {
                expected: batch.len(),
                got: vectors.len(),
            }));
        }
        Ok(vectors)
    });

    let mut vectors = Vec::new();
    let mut embedded_indices = Vec::new();
    for (batch_index, block) in outcome.completed {
        let base = batch_index * batch_size;
        for (offset, vector) in block.into_iter().enumerate() {
            vectors.push(vector);
            embedded_indices.push(base + offset);
        }
    }

    (vectors, embedded_indices)
}

#[cfg(test)]
mod tests {
    use super::{embed_in_batches, Embedder, HashingEmbedder};
    use crate::error::EmbedError;

    #[test]
    fn embedder_is_deterministic() {
        let embedder = HashingEmbedder::default();
        let texts = vec!["Hydraulic pressure and flow".to_string()];
        let first = embedder.encode(&texts).unwrap();
        let second = embedder.encode(&texts).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn vectors_are_unit_normalized() {
        let embedder = HashingEmbedder { dimension: 64 };
        let texts = vec!["some document text to embed".to_string()];
        let vectors = embedder.encode(&texts).unwrap();
        let norm: f32 = vectors[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn batching_preserves_order_and_alignment() {
        let embedder = HashingEmbedder { dimension: 32 };
        let texts: Vec<String> = (0..10).map(|i| format!("text number {i}")).collect();

        let (vectors, indices) = embed_in_batches(&embedder, &texts, 3, 4);
        assert_eq!(vectors.len(), 10);
        assert_eq!(indices, (0..10).collect::<Vec<_>>());

        // Flattened batch output must equal a single-batch run.
        let direct = embedder.encode(&texts).unwrap();
        assert_eq!(vectors, direct);
    }

    #[test]
    fn failing_batch_drops_only_its_own_texts() {
        struct Flaky {
            inner: HashingEmbedder,
        }

        impl Embedder for Flaky {
            fn dimension(&self) -> usize {
                self.inner.dimension
            }

            fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
                if texts.iter().any(|text| text.contains("poison")) {
                    return Err(EmbedError::Batch("poisoned batch".to_string()));
                }
                self.inner.encode(texts)
            }
        }

        let embedder = Flaky {
            inner: HashingEmbedder { dimension: 16 },
        };
        let texts: Vec<String> = vec![
            "alpha".into(),
            "beta".into(),
            "poison pill".into(),
            "gamma".into(),
            "delta".into(),
            "epsilon".into(),
        ];

        let (vectors, indices) = embed_in_batches(&embedder, &texts, 2, 2);
        // Batch [2, 3] fails; the others survive in order.
        assert_eq!(indices, vec![0, 1, 4, 5]);
        assert_eq!(vectors.len(), 4);
    }
}
