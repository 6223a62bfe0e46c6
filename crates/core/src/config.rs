use crate::error::PipelineError;
use std::path::PathBuf;

/// Immutable pipeline settings, constructed once and passed by reference to
/// every component. Benchmark-derived figures live in
/// [`crate::estimate::RuntimeEstimate`] instead.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub min_chunk_words: usize,
    pub max_chunk_words: usize,
    pub pdf_workers: usize,
    pub embed_workers: usize,
    pub embed_batch_size: usize,
    pub dedup_threshold: f32,
    pub default_top_k: usize,
    pub max_display_chars: usize,
    pub database_root: PathBuf,
    pub database_name: String,
    pub verbose: bool,
    pub section_patterns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_chunk_words: 3,
            max_chunk_words: 1_500,
            pdf_workers: 4,
            embed_workers: 4,
            embed_batch_size: 32,
            dedup_threshold: 0.90,
            default_top_k: 5,
            max_display_chars: 1_500,
            database_root: PathBuf::from("databases"),
            database_name: "default".to_string(),
            verbose: false,
            section_patterns: default_section_patterns(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_chunk_words == 0 {
            return Err(PipelineError::InvalidChunkConfig(
                "max_chunk_words must be positive".to_string(),
            ));
        }
        if self.min_chunk_words > self.max_chunk_words {
            return Err(PipelineError::InvalidChunkConfig(format!(
                "min_chunk_words {} exceeds max_chunk_words {}",
                self.min_chunk_words, self.max_chunk_words
            )));
        }
        if !(0.0..=1.0).contains(&self.dedup_threshold) {
            return Err(PipelineError::InvalidChunkConfig(format!(
                "dedup_threshold {} outside 0..1",
                self.dedup_threshold
            )));
        }
        Ok(())
    }

    pub fn database_dir(&self) -> PathBuf {
        self.database_root.join(&self.database_name)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.database_dir()
            .join(format!("{}.json", self.database_name))
    }

    pub fn index_path(&self) -> PathBuf {
        self.database_dir()
            .join(format!("{}.faiss", self.database_name))
    }
}

/// Structural break patterns applied in order by the chunker. English and
/// French variants; earlier patterns produce the fragments later ones see.
pub fn default_section_patterns() -> Vec<String> {
    [
        // Headers and structural elements
        r"(?i)Section \d+[\.\:].*?\n",
        r"(?i)Chapter \d+[\.\:].*?\n",
        r"(?i)Article \d+[\.\:].*?\n",
        r"(?i)Part \d+[\.\:].*?\n",
        r"(?i)Appendix [A-Z][\.\:].*?\n",
        r"(?i)Chapitre \d+[\.\:].*?\n",
        r"(?i)Partie \d+[\.\:].*?\n",
        r"(?i)Annexe [A-Z][\.\:].*?\n",
        // Numbered and lettered sections
        r"\n\d+[\.\)] ",
        r"\n[A-Z][\.\)] ",
        r"\n[ivxIVX]+[\.\)] ",
        r"\n\d+\.\d+[\.\)] ",
        r"\n\d+\.\d+\.\d+[\.\)] ",
        // List markers
        r"\n[-•*▪◦○●] ",
        r"\n\d+\. ",
        r"\n[a-z][\.\)] ",
        // Whitespace and separator runs
        r"\n\s*\n",
        r"\t+",
        r" {3,}",
        r"_{3,}",
        r"-{3,}",
        r"\*{3,}",
        r"={3,}",
        r"~{3,}",
        r"\.{3,}",
        r"…+",
        // Document structure cues
        r"(?i)Table of contents.*?\n",
        r"(?i)Contents.*?\n",
        r"(?i)Abstract.*?\n",
        r"(?i)Summary.*?\n",
        r"(?i)Introduction.*?\n",
        r"(?i)Conclusion.*?\n",
        r"(?i)Bibliography.*?\n",
        r"(?i)References.*?\n",
        r"(?i)Acknowledgments.*?\n",
        r"(?i)Table des matières.*?\n",
        r"(?i)Sommaire.*?\n",
        r"(?i)Résumé.*?\n",
        r"(?i)Bibliographie.*?\n",
        r"(?i)Références.*?\n",
        r"(?i)Remerciements.*?\n",
        r"(?i)Overview.*?\n",
        r"(?i)Background.*?\n",
        r"(?i)Methods?.*?\n",
        r"(?i)Results?.*?\n",
        r"(?i)Discussion.*?\n",
    ]
    .iter()
    .map(|pattern| (*pattern).to_string())
    .collect()
}
