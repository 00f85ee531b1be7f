//! Offline index build: CSV rows → chunks → embeddings → persisted store.

use std::path::{Path, PathBuf};

use jiwa_llm::{EmbeddingProvider, InputKind};

use crate::error::{IndexError, Result};
use crate::loader::load_csv;
use crate::splitter::{SplitterConfig, TextSplitter};
use crate::store::LocalVectorStore;
use crate::types::Chunk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    pub rows: usize,
    pub chunks: usize,
    pub dimension: usize,
}

pub struct IndexBuilder {
    index_dir: PathBuf,
    splitter: TextSplitter,
}

impl IndexBuilder {
    #[must_use]
    pub fn new(index_dir: impl Into<PathBuf>, splitter: SplitterConfig) -> Self {
        Self {
            index_dir: index_dir.into(),
            splitter: TextSplitter::new(splitter),
        }
    }

    #[must_use]
    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Rebuild the index from `source`.
    ///
    /// `embedder` is `None` when no embedding credential is configured. The
    /// existing index directory is only touched once every chunk is embedded.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::MissingSource`] or [`IndexError::MissingCredential`]
    /// before any work is done; otherwise propagates load, embedding, and write
    /// failures.
    pub async fn build<E: EmbeddingProvider>(
        &self,
        source: &Path,
        embedder: Option<&E>,
    ) -> Result<IndexReport> {
        if !source.exists() {
            return Err(IndexError::MissingSource(source.to_path_buf()));
        }
        let embedder = embedder.ok_or(IndexError::MissingCredential)?;

        let documents = load_csv(source)?;
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|d| self.splitter.split(d))
            .collect();
        tracing::info!(rows = documents.len(), chunks = chunks.len(), "split knowledge base");

        let mut store = LocalVectorStore::new(embedder.model());
        let batch_size = embedder.max_batch().max(1);
        let total_batches = chunks.len().div_ceil(batch_size);
        for (i, batch) in chunks.chunks(batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = embedder.embed_batch(&texts, InputKind::Document).await?;
            if vectors.len() != batch.len() {
                return Err(IndexError::Llm(jiwa_llm::LlmError::EmbeddingCount {
                    sent: batch.len(),
                    received: vectors.len(),
                }));
            }
            for (chunk, vector) in batch.iter().zip(vectors) {
                store.insert(chunk, vector)?;
            }
            tracing::info!(batch = i + 1, total = total_batches, "embedded batch");
        }

        store.save(&self.index_dir).await?;

        Ok(IndexReport {
            rows: documents.len(),
            chunks: store.len(),
            dimension: store.dimension(),
        })
    }
}
