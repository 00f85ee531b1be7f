//! Similarity search over a persisted index.

use std::future::Future;
use std::path::Path;

use jiwa_llm::{EmbeddingProvider, InputKind};

use crate::error::RetrieverError;
use crate::store::{LocalVectorStore, ScoredChunk};

/// Outcome of a search that got past query validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    Hits(Vec<ScoredChunk>),
    Empty,
    /// Search could not run; the reason is already logged.
    Failed(String),
}

impl Retrieval {
    /// Passages found, treating `Empty` and `Failed` alike.
    #[must_use]
    pub fn into_hits(self) -> Vec<ScoredChunk> {
        match self {
            Self::Hits(hits) => hits,
            Self::Empty | Self::Failed(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Anything that can answer a top-k passage query.
pub trait Searcher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`RetrieverError::EmptyQuery`] for blank queries. Other failures
    /// are reported as [`Retrieval::Failed`].
    fn search(
        &self,
        query: &str,
        k: usize,
    ) -> impl Future<Output = Result<Retrieval, RetrieverError>> + Send;
}

pub struct Retriever<E> {
    store: LocalVectorStore,
    embedder: E,
}

impl<E> std::fmt::Debug for Retriever<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<E: EmbeddingProvider> Retriever<E> {
    /// Load the index at `path` for querying with `embedder`.
    ///
    /// `embedder` is `None` when no embedding credential is configured.
    ///
    /// # Errors
    ///
    /// Checked in order: [`RetrieverError::IndexNotFound`],
    /// [`RetrieverError::MissingCredential`], [`RetrieverError::Load`],
    /// [`RetrieverError::ModelMismatch`].
    pub async fn open(path: &Path, embedder: Option<E>) -> Result<Self, RetrieverError> {
        if !path.exists() {
            return Err(RetrieverError::IndexNotFound(path.to_path_buf()));
        }
        let embedder = embedder.ok_or(RetrieverError::MissingCredential)?;
        let store = LocalVectorStore::load(path)
            .await
            .map_err(RetrieverError::Load)?;

        if store.embedding_model() != embedder.model() {
            return Err(RetrieverError::ModelMismatch {
                index: store.embedding_model().to_owned(),
                configured: embedder.model().to_owned(),
            });
        }

        tracing::info!(
            path = %path.display(),
            chunks = store.len(),
            model = embedder.model(),
            "retriever ready"
        );
        Ok(Self { store, embedder })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl<E: EmbeddingProvider> Searcher for Retriever<E> {
    async fn search(&self, query: &str, k: usize) -> Result<Retrieval, RetrieverError> {
        if query.trim().is_empty() {
            return Err(RetrieverError::EmptyQuery);
        }
        if self.store.is_empty() {
            return Ok(Retrieval::Empty);
        }

        let vector = match self.embedder.embed(query, InputKind::Query).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("query embedding failed: {e}");
                return Ok(Retrieval::Failed(e.to_string()));
            }
        };
        if vector.len() != self.store.dimension() {
            let reason = format!(
                "query vector has dimension {}, index has {}",
                vector.len(),
                self.store.dimension()
            );
            tracing::warn!("{reason}");
            return Ok(Retrieval::Failed(reason));
        }

        let hits = self.store.search(&vector, k);
        tracing::debug!(k, hits = hits.len(), "index search");
        if hits.is_empty() {
            Ok(Retrieval::Empty)
        } else {
            Ok(Retrieval::Hits(hits))
        }
    }
}
