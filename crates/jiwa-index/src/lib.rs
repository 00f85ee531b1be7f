//! Embedding index over a tabular knowledge base: build once, search many times.

pub mod builder;
pub mod error;
pub mod loader;
pub mod retriever;
pub mod splitter;
pub mod store;
pub mod types;

pub use builder::{IndexBuilder, IndexReport};
pub use error::{IndexError, RetrieverError};
pub use retriever::{Retrieval, Retriever, Searcher};
pub use splitter::{SplitterConfig, TextSplitter};
pub use store::{LocalVectorStore, Manifest, ScoredChunk};
pub use types::{Chunk, Document};
