use crate::chunker::Chunker;
use crate::config::PipelineConfig;
use crate::dedupe::dedupe;
use crate::embedder::{embed_in_batches, Embedder};
use crate::error::{IndexError, PipelineError, Result};
use crate::extractor::{discover_pdf_files, PdfExtractor};
use crate::index::FlatIndex;
use crate::metadata::MetadataStore;
use crate::models::{DedupReport, IngestionReport, SkippedPdf, TextChunk};
use crate::parallel::map_ordered;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// The persisted unit of work: a document → chunk mapping plus a flat vector
/// index whose row `i` is the embedding of the chunk at flattened position
/// `i`. Every mutation keeps the two in lockstep.
pub struct VectorDatabase {
    metadata: MetadataStore,
    index: FlatIndex,
}

impl VectorDatabase {
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// Run the full ingestion pipeline over `input_dir`. Stages are strictly
    /// sequential: extraction completes before chunking starts, chunking
    /// before embedding, embedding before deduplication and indexing.
    pub fn ingest<X, E>(
        input_dir: &Path,
        extractor: &X,
        embedder: &E,
        config: &PipelineConfig,
        apply_dedup: bool,
    ) -> Result<(Self, IngestionReport)>
    where
        X: PdfExtractor,
        E: Embedder,
    {
        config.validate()?;
        let chunker = Chunker::new(config)?;

        let files = discover_pdf_files(input_dir);
        if files.is_empty() {
            return Err(PipelineError::NoInputFiles(
                input_dir.display().to_string(),
            ));
        }

        info!(files = files.len(), "extracting text from pdfs");
        let file_list = files.clone();
        let extraction = map_ordered(files, config.pdf_workers, "extract", |_, path| {
            let pages = extractor.extract_pages(&path)?;
            Ok((path, pages))
        });

        let skipped_files: Vec<SkippedPdf> = extraction
            .failed
            .iter()
            .map(|(index, error)| SkippedPdf {
                path: file_list[*index].clone(),
                reason: error.to_string(),
            })
            .collect();

        let mut report = IngestionReport {
            skipped_files,
            ..IngestionReport::default()
        };

        let mut chunks: Vec<TextChunk> = Vec::new();
        let mut next_chunk_id = 0u64;
        for (path, pages) in extraction.results() {
            let pdf_path = path.display().to_string();
            let mut document_chunks = 0usize;

            for page in &pages {
                for (position, text) in chunker.segment(&page.text).into_iter().enumerate() {
                    chunks.push(TextChunk {
                        text,
                        pdf_path: pdf_path.clone(),
                        chunk_id: next_chunk_id,
                        page_number: page.number,
                        position_in_page: position as u32,
                    });
                    next_chunk_id += 1;
                    document_chunks += 1;
                }
            }

            report.pages += pages.len();
            if document_chunks > 0 {
                report.documents += 1;
            }
            debug!(pdf = %pdf_path, chunks = document_chunks, "chunked document");
        }
        report.chunks = chunks.len();

        info!(chunks = chunks.len(), "generating embeddings");
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let (vectors, embedded_indices) = embed_in_batches(
            embedder,
            &texts,
            config.embed_batch_size,
            config.embed_workers,
        );

        // A failed batch drops its chunks from metadata too, so the stores
        // cannot drift apart.
        if embedded_indices.len() != chunks.len() {
            warn!(
                dropped = chunks.len() - embedded_indices.len(),
                "chunks without embeddings were excluded"
            );
            chunks = select_by_index(chunks, &embedded_indices);
        }

        let (kept_vectors, kept_chunks) = if apply_dedup {
            let (kept, kept_indices) = dedupe(&vectors, config.dedup_threshold);
            info!(kept = kept.len(), total = vectors.len(), "deduplicated vectors");
            (kept, select_by_index(chunks, &kept_indices))
        } else {
            (vectors, chunks)
        };
        report.kept_vectors = kept_vectors.len();

        let mut metadata = MetadataStore::new();
        for chunk in kept_chunks {
            metadata.add_chunk(chunk);
        }

        let mut index = FlatIndex::new(embedder.dimension());
        index.add(&kept_vectors)?;

        let database = Self { metadata, index };
        database.check_consistency()?;
        Ok((database, report))
    }

    pub fn save(&self, config: &PipelineConfig) -> Result<()> {
        let dir = config.database_dir();
        fs::create_dir_all(&dir).map_err(IndexError::Io)?;

        self.metadata.save(&config.metadata_path())?;
        self.index.save(&config.index_path())?;
        info!(database = %dir.display(), "database saved");
        Ok(())
    }

    /// Load a persisted database. A missing metadata file yields an empty
    /// database; an index whose dimension differs from the embedder's is
    /// rejected here rather than at first search.
    pub fn load<E: Embedder>(embedder: &E, config: &PipelineConfig) -> Result<Self> {
        let metadata = MetadataStore::load(&config.metadata_path())?;

        let index_path = config.index_path();
        let index = if index_path.exists() {
            FlatIndex::load(&index_path, embedder.dimension())?
        } else if metadata.is_empty() {
            FlatIndex::new(embedder.dimension())
        } else {
            return Err(PipelineError::Index(IndexError::MissingIndexFile(
                index_path.display().to_string(),
            )));
        };

        let database = Self { metadata, index };
        database.check_consistency()?;
        Ok(database)
    }

    /// Re-embed the stored chunks, drop near-duplicate vectors, and rebuild
    /// both stores from the same kept-indices list. The rebuild is staged
    /// into fresh structures and swapped in only on full success, so a
    /// failure leaves the database untouched.
    pub fn deduplicate<E: Embedder>(
        &mut self,
        embedder: &E,
        config: &PipelineConfig,
    ) -> Result<DedupReport> {
        let texts: Vec<String> = self
            .metadata
            .flattened()
            .iter()
            .map(|chunk| chunk.text.clone())
            .collect();
        let before = texts.len();

        let (vectors, embedded_indices) = embed_in_batches(
            embedder,
            &texts,
            config.embed_batch_size,
            config.embed_workers,
        );
        if embedded_indices.len() != before {
            return Err(PipelineError::Embed(crate::error::EmbedError::Batch(
                format!(
                    "only {} of {} chunks could be re-embedded, aborting rebuild",
                    embedded_indices.len(),
                    before
                ),
            )));
        }

        let (kept_vectors, kept_indices) = dedupe(&vectors, config.dedup_threshold);

        let staged_metadata = self.metadata.retain_flattened(&kept_indices);
        let mut staged_index = FlatIndex::new(embedder.dimension());
        staged_index.add(&kept_vectors)?;

        self.metadata = staged_metadata;
        self.index = staged_index;
        self.check_consistency()?;

        let report = DedupReport {
            before,
            after: kept_indices.len(),
        };
        info!(before = report.before, after = report.after, "deduplication complete");
        Ok(report)
    }

    fn check_consistency(&self) -> Result<()> {
        if self.metadata.len() != self.index.len() {
            return Err(PipelineError::Inconsistent(format!(
                "{} metadata chunks vs {} index rows",
                self.metadata.len(),
                self.index.len()
            )));
        }
        Ok(())
    }
}

fn select_by_index(chunks: Vec<TextChunk>, indices: &[usize]) -> Vec<TextChunk> {
    let mut chunks: Vec<Option<TextChunk>> = chunks.into_iter().map(Some).collect();
    indices
        .iter()
        .filter_map(|&index| chunks.get_mut(index).and_then(Option::take))
        .collect()
}
