use crate::config::PipelineConfig;
use crate::error::PipelineError;
use regex::Regex;

/// Pattern-based text segmentation with word-count normalization.
///
/// Patterns are applied in sequence over the working fragment set rather than
/// as one combined regex: later patterns must see the finer-grained fragments
/// produced by earlier ones. A matched separator is kept glued to the fragment
/// that follows it, so headings stay attached to the content they introduce.
pub struct Chunker {
    patterns: Vec<Regex>,
    min_words: usize,
    max_words: usize,
}

impl Chunker {
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let patterns = config
            .section_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            min_words: config.min_chunk_words,
            max_words: config.max_chunk_words,
        })
    }

    pub fn segment(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut fragments = vec![text.to_string()];
        for pattern in &self.patterns {
            let mut next = Vec::new();
            for fragment in &fragments {
                split_at_matches(pattern, fragment, &mut next);
            }
            fragments = next;
        }

        let normalized = self.normalize_sizes(&fragments);
        self.merge_small(normalized)
    }

    /// Walk fragments in order, accumulating words into a running buffer that
    /// never exceeds `max_words`. Oversized fragments are cut into
    /// consecutive max-size pieces; the trailing remainder seeds the next
    /// buffer so it can still merge with following fragments.
    fn normalize_sizes(&self, fragments: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();

        for fragment in fragments {
            let words: Vec<&str> = fragment.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }

            if words.len() > self.max_words {
                if !buffer.is_empty() {
                    chunks.push(buffer.join(" "));
                    buffer.clear();
                }
                let mut rest = words.as_slice();
                while rest.len() > self.max_words {
                    chunks.push(rest[..self.max_words].join(" "));
                    rest = &rest[self.max_words..];
                }
                buffer.extend_from_slice(rest);
            } else if buffer.len() + words.len() > self.max_words {
                chunks.push(buffer.join(" "));
                buffer.clear();
                buffer.extend_from_slice(&words);
            } else {
                buffer.extend_from_slice(&words);
            }
        }

        if !buffer.is_empty() {
            chunks.push(buffer.join(" "));
        }

        chunks
    }

    /// Greedily concatenate consecutive chunks up to `max_words`. Chunks that
    /// would finish below `min_words` are dropped, not emitted.
    fn merge_small(&self, chunks: Vec<String>) -> Vec<String> {
        let mut merged = Vec::new();
        let mut buffer = String::new();
        let mut buffer_words = 0usize;

        for chunk in chunks {
            let count = chunk.split_whitespace().count();

            if buffer_words + count <= self.max_words {
                if !buffer.is_empty() {
                    buffer.push(' ');
                }
                buffer.push_str(&chunk);
                buffer_words += count;
            } else {
                if buffer_words >= self.min_words {
                    merged.push(std::mem::take(&mut buffer));
                } else {
                    buffer.clear();
                }
                buffer.push_str(&chunk);
                buffer_words = count;
            }
        }

        if buffer_words >= self.min_words {
            merged.push(buffer);
        }

        merged
    }
}

fn split_at_matches(pattern: &Regex, fragment: &str, out: &mut Vec<String>) {
    let mut cuts = vec![0];
    for found in pattern.find_iter(fragment) {
        if found.start() > 0 {
            cuts.push(found.start());
        }
    }
    cuts.push(fragment.len());
    cuts.dedup();

    for pair in cuts.windows(2) {
        let piece = &fragment[pair[0]..pair[1]];
        if !piece.is_empty() {
            out.push(piece.to_string());
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
