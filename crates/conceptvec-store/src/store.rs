//! Concept embedding storage.
//!
//! Provides an immutable table mapping concept identifiers to fixed-length
//! embedding vectors, backed by a hash map from id to row index into a
//! contiguous row-major matrix, plus an id→description side table.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Sentinel rendered when a concept has no registered description.
pub const NO_DESCRIPTION: &str = "N/A";

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Dimension mismatch for concept '{id}': expected {expected}, found {found}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        found: usize,
    },
    #[error("Embedding data is empty")]
    Empty,
    #[error("Concept not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A description value as it appears in the descriptions artifact:
/// either a single string or an array of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DescriptionValue {
    One(String),
    Many(Vec<String>),
}

impl DescriptionValue {
    fn into_vec(self) -> Vec<String> {
        match self {
            DescriptionValue::One(s) => vec![s],
            DescriptionValue::Many(v) => v,
        }
    }
}

/// Immutable in-memory store of concept embeddings.
///
/// Loaded once at process start and shared read-only across searches.
/// Concept ids map to row indices into a contiguous `[size, dim]` matrix,
/// so lookups are O(1) and the full matrix can be scanned without pointer
/// chasing. Ids are assigned row indices in sorted order, which keeps
/// indices stable across loads of the same artifact.
pub struct ConceptStore {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    matrix: Vec<f32>,
    dim: usize,
    descriptions: HashMap<String, Vec<String>>,
}

impl ConceptStore {
    /// Build a store from in-memory parts.
    ///
    /// Entries are sorted by id before index assignment. Fails if the
    /// entries are empty or any vector's dimensionality disagrees with
    /// the first one.
    pub fn from_parts(
        mut entries: Vec<(String, Vec<f32>)>,
        descriptions: HashMap<String, Vec<String>>,
    ) -> Result<Self> {
        if entries.is_empty() {
            return Err(StoreError::Empty);
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let dim = entries[0].1.len();
        if dim == 0 {
            return Err(StoreError::Empty);
        }

        let mut ids = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        let mut matrix = Vec::with_capacity(entries.len() * dim);

        for (id, vector) in entries {
            if vector.len() != dim {
                return Err(StoreError::DimensionMismatch {
                    id,
                    expected: dim,
                    found: vector.len(),
                });
            }
            index.insert(id.clone(), ids.len());
            ids.push(id);
            matrix.extend_from_slice(&vector);
        }

        Ok(Self {
            ids,
            index,
            matrix,
            dim,
            descriptions,
        })
    }

    /// Load a store from an embeddings artifact and a descriptions artifact.
    ///
    /// The embeddings file is a JSON object of concept id → numeric array;
    /// the descriptions file is a JSON object of concept id → string or
    /// array of strings. Ids present in the embeddings but absent from the
    /// descriptions render as [`NO_DESCRIPTION`].
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        embeddings_path: P,
        descriptions_path: Q,
    ) -> Result<Self> {
        let raw = fs::read_to_string(embeddings_path.as_ref())?;
        // BTreeMap gives a deterministic id→index assignment.
        let parsed: BTreeMap<String, Vec<f32>> = serde_json::from_str(&raw)?;
        let entries: Vec<(String, Vec<f32>)> = parsed.into_iter().collect();

        let descriptions = Self::load_descriptions(descriptions_path.as_ref())?;

        let store = Self::from_parts(entries, descriptions)?;
        tracing::info!(
            concepts = store.size(),
            dim = store.dim(),
            described = store.descriptions.len(),
            "Loaded concept embedding store"
        );
        Ok(store)
    }

    fn load_descriptions(path: &Path) -> Result<HashMap<String, Vec<String>>> {
        let raw = fs::read_to_string(path)?;
        let parsed: HashMap<String, DescriptionValue> = serde_json::from_str(&raw)?;
        Ok(parsed
            .into_iter()
            .map(|(id, v)| (id, v.into_vec()))
            .collect())
    }

    /// Number of concepts in the store.
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    /// Dimensionality shared by all vectors.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Look up a concept's embedding vector by id.
    pub fn lookup(&self, id: &str) -> Result<&[f32]> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.vector_at(idx))
    }

    /// Row index of a concept id, if present.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Concept id at a row index.
    ///
    /// Panics if `idx` is out of range; indices come from this store.
    pub fn id_at(&self, idx: usize) -> &str {
        &self.ids[idx]
    }

    /// Embedding vector at a row index.
    pub fn vector_at(&self, idx: usize) -> &[f32] {
        let start = idx * self.dim;
        &self.matrix[start..start + self.dim]
    }

    /// The full `[size, dim]` matrix as a flat row-major slice.
    pub fn matrix(&self) -> &[f32] {
        &self.matrix
    }

    /// Human-readable description for a concept id.
    ///
    /// Multiple registered descriptions are joined with " or "; an absent
    /// or empty entry renders as [`NO_DESCRIPTION`].
    pub fn describe(&self, id: &str) -> String {
        match self.descriptions.get(id) {
            Some(descs) if !descs.is_empty() => descs.join(" or "),
            _ => NO_DESCRIPTION.to_string(),
        }
    }
}
