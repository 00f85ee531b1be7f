use std::future::Future;
use std::pin::Pin;

use futures_core::Stream;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Boxed stream of text deltas produced by a streaming chat call.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

pub trait LlmProvider: Send + Sync {
    /// Send messages and receive the response as a stream of text deltas.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be started. Errors raised mid-stream are
    /// yielded as stream items.
    fn chat_stream(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<ChatStream, LlmError>> + Send;

    fn name(&self) -> &str;
}

/// How a text is going to be used, for providers that embed queries and documents
/// into asymmetric spaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Document,
    Query,
}

pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in the same order.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails or returns a different number of vectors.
    fn embed_batch(
        &self,
        texts: &[String],
        kind: InputKind,
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send;

    /// Embedding model identifier, persisted alongside an index.
    fn model(&self) -> &str;

    /// Maximum number of texts accepted by a single [`embed_batch`](Self::embed_batch) call.
    fn max_batch(&self) -> usize {
        96
    }

    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails or returns no vector.
    fn embed(
        &self,
        text: &str,
        kind: InputKind,
    ) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send {
        let texts = vec![text.to_owned()];
        async move {
            self.embed_batch(&texts, kind)
                .await?
                .into_iter()
                .next()
                .ok_or(LlmError::EmbeddingCount {
                    sent: 1,
                    received: 0,
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let role: Role = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(role, Role::System);
    }

    #[test]
    fn message_serializes_role_and_content_only() {
        let msg = Message::user("halo");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, serde_json::json!({"role": "user", "content": "halo"}));
    }

    #[test]
    fn role_as_str_matches_serde() {
        for role in [Role::System, Role::User, Role::Assistant] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json.trim_matches('"'), role.as_str());
        }
    }

    struct FixedEmbedder;

    impl EmbeddingProvider for FixedEmbedder {
        async fn embed_batch(
            &self,
            texts: &[String],
            _kind: InputKind,
        ) -> Result<Vec<Vec<f32>>, LlmError> {
            Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
        }

        #[allow(clippy::unnecessary_literal_bound)]
        fn model(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn default_embed_uses_batch() {
        let vector = FixedEmbedder.embed("abc", InputKind::Query).await.unwrap();
        assert_eq!(vector, vec![3.0]);
    }

    struct EmptyEmbedder;

    impl EmbeddingProvider for EmptyEmbedder {
        async fn embed_batch(
            &self,
            _texts: &[String],
            _kind: InputKind,
        ) -> Result<Vec<Vec<f32>>, LlmError> {
            Ok(Vec::new())
        }

        #[allow(clippy::unnecessary_literal_bound)]
        fn model(&self) -> &str {
            "empty"
        }
    }

    #[tokio::test]
    async fn default_embed_reports_missing_vector() {
        let err = EmptyEmbedder.embed("abc", InputKind::Query).await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::EmbeddingCount {
                sent: 1,
                received: 0
            }
        ));
    }
}
