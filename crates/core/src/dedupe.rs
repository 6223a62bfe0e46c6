/// Greedy near-duplicate filter over an ordered vector sequence.
///
/// The first vector is always kept. Each later vector is compared against
/// every vector already kept; it is dropped when its best cosine similarity
/// exceeds `threshold`. Order-sensitive and first-occurrence-wins by design:
/// a near-duplicate of an earlier *discarded* vector can still survive if it
/// differs enough from everything actually retained. O(n²), which is fine at
/// this layer since corpora are bounded by memory, not runtime.
///
/// Returns the kept vectors and their original indices; the caller must
/// filter metadata with the same index list to keep both stores in lockstep.
pub fn dedupe(vectors: &[Vec<f32>], threshold: f32) -> (Vec<Vec<f32>>, Vec<usize>) {
    let mut kept: Vec<Vec<f32>> = Vec::new();
    let mut kept_indices: Vec<usize> = Vec::new();

    for (index, vector) in vectors.iter().enumerate() {
        let duplicate = kept
            .iter()
            .any(|existing| cosine_similarity(existing, vector) > threshold);

        if kept.is_empty() || !duplicate {
            kept.push(vector.clone());
            kept_indices.push(index);
        }
    }

    (kept, kept_indices)
}

pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm: f32 = left.iter().map(|v| v * v).sum::<f32>().sqrt();
    let right_norm: f32 = right.iter().map(|v| v * v).sum::<f32>().sqrt();

    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm * right_norm)
}
