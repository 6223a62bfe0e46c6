use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Flat L2 nearest-neighbor index: an exhaustive scan over row-major f32
/// vectors. Row `i` corresponds to the chunk at flattened metadata position
/// `i`; keeping that correspondence is the caller's contract.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    dimension: u32,
    vectors: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            vectors: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<(), IndexError> {
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dimension,
                    got: vector.len(),
                });
            }
        }
        for vector in vectors {
            self.vectors.extend_from_slice(vector);
        }
        Ok(())
    }

    /// Returns up to `k` `(squared L2 distance, row id)` pairs, ascending by
    /// distance.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(row, stored)| {
                let distance = stored
                    .iter()
                    .zip(query)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>();
                (distance, row)
            })
            .collect();

        scored.sort_by(|left, right| left.0.total_cmp(&right.0));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        let record = PersistedIndex {
            dimension: self.dimension as u32,
            vectors: self.vectors.clone(),
        };
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, &record)?;
        Ok(())
    }

    /// Load persisted contents into an index shell of `expected_dimension`.
    /// A dimension that differs from the current embedder's is a fatal
    /// configuration error, reported here rather than at first search.
    pub fn load(path: &Path, expected_dimension: usize) -> Result<Self, IndexError> {
        let reader = BufReader::new(File::open(path)?);
        let record: PersistedIndex = bincode::deserialize_from(reader)?;

        let dimension = record.dimension as usize;
        if dimension != expected_dimension {
            return Err(IndexError::DimensionMismatch {
                expected: expected_dimension,
                got: dimension,
            });
        }
        if dimension == 0 || record.vectors.len() % dimension != 0 {
            return Err(IndexError::Codec(Box::new(bincode::ErrorKind::Custom(
                format!("index vector data not a multiple of dimension {dimension}"),
            ))));
        }

        Ok(Self {
            dimension,
            vectors: record.vectors,
        })
    }
}
