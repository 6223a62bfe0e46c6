use pdf_vector_core::{
    ExtractError, HashingEmbedder, PageText, PdfExtractor, PipelineConfig, VectorDatabase,
    word_count,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// Serves canned page text keyed by file stem, so pipeline behavior can be
/// exercised without real PDF fixtures.
struct CannedExtractor {
    pages: HashMap<String, Vec<PageText>>,
}

impl CannedExtractor {
    fn new(documents: &[(&str, &str)]) -> Self {
        let pages = documents
            .iter()
            .map(|(stem, text)| {
                (
                    (*stem).to_string(),
                    vec![PageText {
                        number: 1,
                        text: (*text).to_string(),
                    }],
                )
            })
            .collect();
        Self { pages }
    }
}

impl PdfExtractor for CannedExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractError> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        self.pages
            .get(stem)
            .cloned()
            .ok_or_else(|| ExtractError::PdfParse(format!("no canned pages for {stem}")))
    }
}

const TWENTY_WORDS: &str = "Section 1. Alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron pi rho sigma";

fn workspace(documents: &[(&str, &str)]) -> (TempDir, PipelineConfig, CannedExtractor) {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("input");
    fs::create_dir(&input).expect("input dir");
    for (stem, _) in documents {
        fs::write(input.join(format!("{stem}.pdf")), b"%PDF-1.4\n%canned").expect("write pdf");
    }

    let config = PipelineConfig {
        min_chunk_words: 3,
        database_root: dir.path().join("databases"),
        database_name: "test_db".to_string(),
        ..PipelineConfig::default()
    };
    let extractor = CannedExtractor::new(documents);
    (dir, config, extractor)
}

#[test]
fn identical_documents_collapse_to_first_occurrence() {
    let documents = [("a", TWENTY_WORDS), ("b", TWENTY_WORDS)];
    let (dir, config, extractor) = workspace(&documents);
    let embedder = HashingEmbedder { dimension: 64 };

    let (db, report) =
        VectorDatabase::ingest(&dir.path().join("input"), &extractor, &embedder, &config, true)
            .expect("ingest");

    assert_eq!(report.documents, 2);
    assert_eq!(report.chunks, 2);
    assert_eq!(report.kept_vectors, 1);

    assert_eq!(db.metadata().len(), 1);
    assert_eq!(db.index().len(), 1);

    let kept = db.metadata().flattened();
    assert!(kept[0].pdf_path.ends_with("a.pdf"));
    assert_eq!(kept[0].page_number, 1);
    assert_eq!(kept[0].position_in_page, 0);
}

#[test]
fn persisted_chunks_respect_word_bounds_and_round_trip() {
    let long_text: String = (0..60)
        .map(|i| format!("token{i}"))
        .collect::<Vec<_>>()
        .join(" ");
    let documents = [("a", TWENTY_WORDS), ("b", long_text.as_str())];
    let (dir, config, extractor) = workspace(&documents);
    let embedder = HashingEmbedder { dimension: 64 };

    let (db, _) =
        VectorDatabase::ingest(&dir.path().join("input"), &extractor, &embedder, &config, false)
            .expect("ingest");

    for chunk in db.metadata().flattened() {
        let count = word_count(&chunk.text);
        assert!(count >= config.min_chunk_words && count <= config.max_chunk_words);
    }

    db.save(&config).expect("save");
    let loaded = VectorDatabase::load(&embedder, &config).expect("load");
    assert_eq!(loaded.metadata().len(), db.metadata().len());
    assert_eq!(loaded.index().len(), db.index().len());
}

#[test]
fn chunk_ids_are_monotonic_across_documents() {
    let documents = [
        ("a", "alpha beta gamma delta epsilon"),
        ("b", "zeta eta theta iota kappa"),
    ];
    let (dir, config, extractor) = workspace(&documents);
    let embedder = HashingEmbedder { dimension: 32 };

    let (db, _) =
        VectorDatabase::ingest(&dir.path().join("input"), &extractor, &embedder, &config, false)
            .expect("ingest");

    let ids: Vec<u64> = db.metadata().flattened().iter().map(|c| c.chunk_id).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn every_indexed_row_resolves_to_its_own_chunk() {
    let documents = [
        ("a", "alpha beta gamma delta epsilon"),
        ("b", "completely different words about hydraulics and pressure"),
        ("c", "a third text concerning unrelated botanical topics entirely"),
    ];
    let (dir, config, extractor) = workspace(&documents);
    let embedder = HashingEmbedder { dimension: 64 };

    let (db, _) =
        VectorDatabase::ingest(&dir.path().join("input"), &extractor, &embedder, &config, false)
            .expect("ingest");

    assert_eq!(db.metadata().len(), db.index().len());
    for chunk in db.metadata().flattened() {
        let hits = db.search(&embedder, &chunk.text, 1).expect("search");
        assert_eq!(hits[0].text, chunk.text);
        assert!(hits[0].score > 0.999);
    }
}

#[test]
fn search_ranks_the_matching_document_first() {
    let documents = [
        ("a", "alpha beta gamma delta epsilon"),
        ("b", "hydraulic pressure relief valve manual"),
        ("c", "botanical field guide to ferns"),
    ];
    let (dir, config, extractor) = workspace(&documents);
    let embedder = HashingEmbedder { dimension: 64 };

    let (db, _) =
        VectorDatabase::ingest(&dir.path().join("input"), &extractor, &embedder, &config, false)
            .expect("ingest");

    let hits = db
        .search(&embedder, "hydraulic pressure relief valve manual", 3)
        .expect("search");
    assert_eq!(hits.len(), 3);
    assert!(hits[0].pdf_path.ends_with("b.pdf"));
    assert!(hits[0].score >= hits[1].score && hits[1].score >= hits[2].score);
}

#[test]
fn deduplicating_an_existing_database_rewrites_both_stores() {
    let documents = [("a", TWENTY_WORDS), ("b", TWENTY_WORDS)];
    let (dir, config, extractor) = workspace(&documents);
    let embedder = HashingEmbedder { dimension: 64 };

    let (db, _) =
        VectorDatabase::ingest(&dir.path().join("input"), &extractor, &embedder, &config, false)
            .expect("ingest");
    db.save(&config).expect("save");

    let mut loaded = VectorDatabase::load(&embedder, &config).expect("load");
    assert_eq!(loaded.metadata().len(), 2);

    let report = loaded.deduplicate(&embedder, &config).expect("dedup");
    assert_eq!(report.before, 2);
    assert_eq!(report.after, 1);
    assert_eq!(loaded.metadata().len(), loaded.index().len());

    loaded.save(&config).expect("save after dedup");
    let reloaded = VectorDatabase::load(&embedder, &config).expect("reload");
    assert_eq!(reloaded.metadata().len(), 1);
}

#[test]
fn missing_database_loads_as_empty() {
    let dir = tempdir().expect("tempdir");
    let config = PipelineConfig {
        database_root: dir.path().join("databases"),
        database_name: "absent".to_string(),
        ..PipelineConfig::default()
    };
    let embedder = HashingEmbedder { dimension: 32 };

    let db = VectorDatabase::load(&embedder, &config).expect("load");
    assert!(db.metadata().is_empty());
    assert_eq!(db.index().len(), 0);

    let hits = db.search(&embedder, "anything", 5).expect("search");
    assert!(hits.is_empty());
}

#[test]
fn loading_with_a_different_embedding_dimension_fails_eagerly() {
    let documents = [("a", TWENTY_WORDS)];
    let (dir, config, extractor) = workspace(&documents);

    let wide = HashingEmbedder { dimension: 64 };
    let (db, _) =
        VectorDatabase::ingest(&dir.path().join("input"), &extractor, &wide, &config, false)
            .expect("ingest");
    db.save(&config).expect("save");

    let narrow = HashingEmbedder { dimension: 32 };
    assert!(VectorDatabase::load(&narrow, &config).is_err());
}

#[test]
fn empty_input_directory_is_a_setup_error() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("input");
    fs::create_dir(&input).expect("input dir");

    let config = PipelineConfig::default();
    let extractor = CannedExtractor::new(&[]);
    let embedder = HashingEmbedder { dimension: 32 };

    let result = VectorDatabase::ingest(&input, &extractor, &embedder, &config, false);
    assert!(result.is_err());
}

#[test]
fn unreadable_document_is_skipped_not_fatal() {
    // Only "a" has canned pages; "broken" makes the extractor fail.
    let documents = [("a", TWENTY_WORDS)];
    let (dir, config, extractor) = workspace(&documents);
    fs::write(dir.path().join("input/broken.pdf"), b"%PDF-1.4\n%broken").expect("write pdf");

    let embedder = HashingEmbedder { dimension: 32 };
    let (db, report) =
        VectorDatabase::ingest(&dir.path().join("input"), &extractor, &embedder, &config, false)
            .expect("ingest");

    assert_eq!(report.skipped_files.len(), 1);
    assert!(report.skipped_files[0]
        .path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == "broken.pdf"));
    assert_eq!(db.metadata().len(), 1);
}
