//! Chat and embedding provider abstraction with hosted backends.

pub mod cohere;
pub mod error;
pub mod gemini;
pub(crate) mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod provider;
pub(crate) mod retry;
pub(crate) mod sse;

pub use error::LlmError;
pub use provider::{ChatStream, EmbeddingProvider, InputKind, LlmProvider, Message, Role};
