use crate::error::StoreError;
use crate::models::TextChunk;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

/// Document → chunk-sequence mapping, kept in document insertion order.
///
/// The flattened traversal (documents in insertion order, chunks in position
/// order) defines the correspondence between metadata entries and vector
/// index rows, and must match the index row-for-row at all times.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MetadataStore {
    documents: Vec<DocumentChunks>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunks {
    pub path: String,
    pub chunks: Vec<TextChunk>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_chunk(&mut self, chunk: TextChunk) {
        match self
            .documents
            .iter_mut()
            .find(|entry| entry.path == chunk.pdf_path)
        {
            Some(entry) => entry.chunks.push(chunk),
            None => self.documents.push(DocumentChunks {
                path: chunk.pdf_path.clone(),
                chunks: vec![chunk],
            }),
        }
    }

    pub fn documents(&self) -> &[DocumentChunks] {
        &self.documents
    }

    pub fn flattened(&self) -> Vec<&TextChunk> {
        self.documents
            .iter()
            .flat_map(|entry| entry.chunks.iter())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.iter().map(|entry| entry.chunks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Stage a new store containing only the chunks at `kept_indices`
    /// (flattened positions), preserving document and chunk order. Used by
    /// deduplication to rebuild metadata from the same index list that
    /// rebuilt the vector index.
    pub fn retain_flattened(&self, kept_indices: &[usize]) -> MetadataStore {
        let flattened = self.flattened();
        let mut staged = MetadataStore::new();
        for &index in kept_indices {
            if let Some(chunk) = flattened.get(index) {
                staged.add_chunk((*chunk).clone());
            }
        }
        staged
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let mut root = Map::new();
        for entry in &self.documents {
            let chunks: Vec<Value> = entry.chunks.iter().map(encode_chunk).collect();
            root.insert(entry.path.clone(), Value::Array(chunks));
        }

        let text = serde_json::to_string_pretty(&Value::Object(root))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// A missing file is an empty store, not an error; this is what lets a
    /// fresh database bootstrap under an existing directory.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let text = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)?;
        let root = value
            .as_object()
            .ok_or_else(|| StoreError::Malformed("top level is not an object".to_string()))?;

        let mut store = Self::new();
        for (pdf_path, chunk_list) in root {
            let chunk_list = chunk_list.as_array().ok_or_else(|| {
                StoreError::Malformed(format!("chunks for {pdf_path} are not an array"))
            })?;

            let mut chunks = Vec::with_capacity(chunk_list.len());
            for record in chunk_list {
                chunks.push(decode_chunk(record)?);
            }
            store.documents.push(DocumentChunks {
                path: pdf_path.clone(),
                chunks,
            });
        }

        Ok(store)
    }
}

// The chunk record schema is an on-disk contract; fields are written and read
// by name so internal struct changes cannot silently change the format.
fn encode_chunk(chunk: &TextChunk) -> Value {
    json!({
        "text": chunk.text,
        "pdf_path": chunk.pdf_path,
        "chunk_id": chunk.chunk_id,
        "page_number": chunk.page_number,
        "position_in_page": chunk.position_in_page,
    })
}

fn decode_chunk(value: &Value) -> Result<TextChunk, StoreError> {
    let field_str = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::Malformed(format!("chunk record missing field {name}")))
    };
    let field_u64 = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_u64)
            .ok_or_else(|| StoreError::Malformed(format!("chunk record missing field {name}")))
    };

    Ok(TextChunk {
        text: field_str("text")?,
        pdf_path: field_str("pdf_path")?,
        chunk_id: field_u64("chunk_id")?,
        page_number: field_u64("page_number")? as u32,
        position_in_page: field_u64("position_in_page")? as u32,
    })
}
