use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A contiguous span of document text selected for embedding. Immutable once
/// created; removed only when deduplication drops its vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    pub pdf_path: String,
    pub chunk_id: u64,
    pub page_number: u32,
    pub position_in_page: u32,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub text: String,
    pub pdf_path: String,
    pub page_number: u32,
    pub score: f32,
}

#[derive(Debug)]
pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IngestionReport {
    pub documents: usize,
    pub pages: usize,
    pub chunks: usize,
    pub kept_vectors: usize,
    pub skipped_files: Vec<SkippedPdf>,
}

#[derive(Debug)]
pub struct DedupReport {
    pub before: usize,
    pub after: usize,
}
