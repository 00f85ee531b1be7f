//! Persisted flat vector store: a manifest plus a JSON array of embedded chunks.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::types::Chunk;

pub const FORMAT_VERSION: u32 = 1;
const MANIFEST_FILE: &str = "manifest.json";
const CHUNKS_FILE: &str = "chunks.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub embedding_model: String,
    pub dimension: usize,
    pub chunk_count: usize,
    /// RFC 3339 build timestamp.
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChunk {
    id: String,
    text: String,
    source: String,
    row: usize,
    chunk_index: usize,
    vector: Vec<f32>,
}

/// A search hit with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub id: String,
    pub text: String,
    pub source: String,
    pub row: usize,
    pub chunk_index: usize,
    pub score: f32,
}

pub struct LocalVectorStore {
    embedding_model: String,
    dimension: usize,
    created_at: String,
    chunks: Vec<StoredChunk>,
}

impl std::fmt::Debug for LocalVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalVectorStore")
            .field("embedding_model", &self.embedding_model)
            .field("dimension", &self.dimension)
            .field("chunks", &self.chunks.len())
            .finish_non_exhaustive()
    }
}

impl LocalVectorStore {
    #[must_use]
    pub fn new(embedding_model: impl Into<String>) -> Self {
        Self {
            embedding_model: embedding_model.into(),
            dimension: 0,
            created_at: chrono::Local::now().to_rfc3339(),
            chunks: Vec::new(),
        }
    }

    /// Add an embedded chunk. The first vector fixes the store's dimension.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Corrupt`] if the vector is empty or its dimension
    /// differs from previously inserted vectors.
    pub fn insert(&mut self, chunk: &Chunk, vector: Vec<f32>) -> Result<()> {
        if vector.is_empty() {
            return Err(IndexError::Corrupt("empty embedding vector".into()));
        }
        if self.dimension == 0 {
            self.dimension = vector.len();
        } else if vector.len() != self.dimension {
            return Err(IndexError::Corrupt(format!(
                "vector dimension {} does not match index dimension {}",
                vector.len(),
                self.dimension
            )));
        }
        self.chunks.push(StoredChunk {
            id: chunk.id(),
            text: chunk.content.clone(),
            source: chunk.source.clone(),
            row: chunk.row,
            chunk_index: chunk.chunk_index,
            vector,
        });
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    #[must_use]
    pub fn manifest(&self) -> Manifest {
        Manifest {
            format_version: FORMAT_VERSION,
            embedding_model: self.embedding_model.clone(),
            dimension: self.dimension,
            chunk_count: self.chunks.len(),
            created_at: self.created_at.clone(),
        }
    }

    /// Top `k` chunks by descending cosine similarity.
    #[must_use]
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(f32, &StoredChunk)> = self
            .chunks
            .iter()
            .map(|c| (cosine_similarity(query, &c.vector), c))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);
        scored
            .into_iter()
            .map(|(score, c)| ScoredChunk {
                id: c.id.clone(),
                text: c.text.clone(),
                source: c.source.clone(),
                row: c.row,
                chunk_index: c.chunk_index,
                score,
            })
            .collect()
    }

    /// Replace whatever is at `dir` with this store.
    ///
    /// The old directory is removed before the new files are written, so a
    /// failure part-way leaves no usable index behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be cleared or the files written.
    pub async fn save(&self, dir: &Path) -> Result<()> {
        if tokio::fs::try_exists(dir).await? {
            tokio::fs::remove_dir_all(dir).await?;
        }
        tokio::fs::create_dir_all(dir).await?;

        let manifest = serde_json::to_vec_pretty(&self.manifest())?;
        tokio::fs::write(dir.join(MANIFEST_FILE), manifest).await?;
        let chunks = serde_json::to_vec(&self.chunks)?;
        tokio::fs::write(dir.join(CHUNKS_FILE), chunks).await?;

        tracing::info!(
            dir = %dir.display(),
            chunks = self.chunks.len(),
            dimension = self.dimension,
            "index saved"
        );
        Ok(())
    }

    /// Load a store previously written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns an error if either file is missing or malformed, or if the
    /// manifest disagrees with the stored chunks.
    pub async fn load(dir: &Path) -> Result<Self> {
        let manifest: Manifest =
            serde_json::from_slice(&tokio::fs::read(dir.join(MANIFEST_FILE)).await?)?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(IndexError::Corrupt(format!(
                "unsupported index format version {}",
                manifest.format_version
            )));
        }

        let chunks: Vec<StoredChunk> =
            serde_json::from_slice(&tokio::fs::read(dir.join(CHUNKS_FILE)).await?)?;
        if chunks.len() != manifest.chunk_count {
            return Err(IndexError::Corrupt(format!(
                "manifest lists {} chunks, found {}",
                manifest.chunk_count,
                chunks.len()
            )));
        }
        if let Some(bad) = chunks.iter().find(|c| c.vector.len() != manifest.dimension) {
            return Err(IndexError::Corrupt(format!(
                "chunk {} has dimension {}, expected {}",
                bad.id,
                bad.vector.len(),
                manifest.dimension
            )));
        }

        tracing::debug!(dir = %dir.display(), chunks = chunks.len(), "index loaded");
        Ok(Self {
            embedding_model: manifest.embedding_model,
            dimension: manifest.dimension,
            created_at: manifest.created_at,
            chunks,
        })
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
