pub mod chunker;
pub mod config;
pub mod database;
pub mod dedupe;
pub mod embedder;
pub mod error;
pub mod estimate;
pub mod extractor;
pub mod index;
pub mod metadata;
pub mod models;
pub mod parallel;
pub mod search;

pub use chunker::{word_count, Chunker};
pub use config::{default_section_patterns, PipelineConfig};
pub use database::VectorDatabase;
pub use dedupe::{cosine_similarity, dedupe};
pub use embedder::{embed_in_batches, Embedder, HashingEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{EmbedError, ExtractError, IndexError, PipelineError, Result, StoreError};
pub use estimate::{Projection, RuntimeEstimate};
pub use extractor::{discover_pdf_files, LopdfExtractor, PageText, PdfExtractor};
pub use index::FlatIndex;
pub use metadata::{DocumentChunks, MetadataStore};
pub use models::{DedupReport, IngestionReport, SearchHit, SkippedPdf, TextChunk};
pub use parallel::{map_ordered, StageOutcome};
