//! Error types for jiwa-index.

use std::path::PathBuf;

/// Errors raised while building or persisting an index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("source file not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("embedding API key is not configured")]
    MissingCredential,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// LLM provider error (embedding).
    #[error("embedding failed: {0}")]
    Llm(#[from] jiwa_llm::LlmError),

    #[error("corrupt index: {0}")]
    Corrupt(String),
}

/// Errors raised by [`crate::Retriever`].
#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    #[error("index directory not found: {}", .0.display())]
    IndexNotFound(PathBuf),

    #[error("embedding API key is not configured")]
    MissingCredential,

    #[error("failed to load index: {0}")]
    Load(#[source] IndexError),

    #[error("index was built with embedding model {index}, but {configured} is configured")]
    ModelMismatch { index: String, configured: String },

    #[error("query must not be empty")]
    EmptyQuery,
}

pub type Result<T> = std::result::Result<T, IndexError>;
