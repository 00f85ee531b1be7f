use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{EmbeddingProvider, InputKind};
use crate::retry::send_with_retry;

pub const DEFAULT_BASE_URL: &str = "https://api.cohere.com";
/// Cohere rejects embed requests carrying more than 96 texts.
const MAX_TEXTS_PER_CALL: usize = 96;
const MAX_RETRIES: u32 = 3;

/// Cohere `/v1/embed` backend.
pub struct CohereEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl fmt::Debug for CohereEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohereEmbedder")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl Clone for CohereEmbedder {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }
}

impl CohereEmbedder {
    #[must_use]
    pub fn new(api_key: String, mut base_url: String, model: String) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: crate::http::default_client(),
            api_key,
            base_url,
            model,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

impl EmbeddingProvider for CohereEmbedder {
    async fn embed_batch(&self, texts: &[String], kind: InputKind) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.len() > MAX_TEXTS_PER_CALL {
            return Err(LlmError::Other(format!(
                "Cohere accepts at most {MAX_TEXTS_PER_CALL} texts per call, got {}",
                texts.len()
            )));
        }

        let body = EmbedRequest {
            model: &self.model,
            texts,
            input_type: match kind {
                InputKind::Document => "search_document",
                InputKind::Query => "search_query",
            },
            truncate: "END",
        };
        let url = format!("{}/v1/embed", self.base_url);

        let response = send_with_retry("cohere", MAX_RETRIES, || {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
        })
        .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!("Cohere embedding API error {status}: {text}");
            return Err(LlmError::Api {
                provider: "cohere",
                status: status.as_u16(),
            });
        }

        let resp: EmbedResponse = serde_json::from_str(&text)?;
        if resp.embeddings.len() != texts.len() {
            return Err(LlmError::EmbeddingCount {
                sent: texts.len(),
                received: resp.embeddings.len(),
            });
        }
        tracing::debug!(count = texts.len(), model = %self.model, "embedded batch");
        Ok(resp.embeddings)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn max_batch(&self) -> usize {
        MAX_TEXTS_PER_CALL
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: &'a [String],
    input_type: &'static str,
    truncate: &'static str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn embedder(server: &MockServer) -> CohereEmbedder {
        CohereEmbedder::new("co-key".into(), server.uri(), "embed-multilingual-v3.0".into())
    }

    #[tokio::test]
    async fn embeds_documents_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embed"))
            .and(header("authorization", "Bearer co-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "embed-multilingual-v3.0",
                "input_type": "search_document"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "x",
                "embeddings": [[0.1, 0.2], [0.3, 0.4]],
                "response_type": "embeddings_floats"
            })))
            .mount(&server)
            .await;

        let vectors = embedder(&server)
            .embed_batch(&["a".into(), "b".into()], InputKind::Document)
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[tokio::test]
    async fn query_uses_search_query_input_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"input_type": "search_query"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"embeddings": [[1.0]]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let vector = embedder(&server).embed("cemas", InputKind::Query).await.unwrap();
        assert_eq!(vector, vec![1.0]);
    }

    #[tokio::test]
    async fn count_mismatch_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"embeddings": [[1.0]]})),
            )
            .mount(&server)
            .await;

        let err = embedder(&server)
            .embed_batch(&["a".into(), "b".into()], InputKind::Document)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmbeddingCount { sent: 2, received: 1 }));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api token"))
            .mount(&server)
            .await;

        let err = embedder(&server).embed("x", InputKind::Query).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { provider: "cohere", status: 401 }));
    }

    #[tokio::test]
    async fn empty_batch_skips_network() {
        let e = CohereEmbedder::new("k".into(), "http://127.0.0.1:1".into(), "m".into());
        assert!(e.embed_batch(&[], InputKind::Document).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_batch_rejected() {
        let e = CohereEmbedder::new("k".into(), "http://127.0.0.1:1".into(), "m".into());
        let texts = vec![String::from("x"); MAX_TEXTS_PER_CALL + 1];
        assert!(e.embed_batch(&texts, InputKind::Document).await.is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let e = CohereEmbedder::new("co-secret".into(), DEFAULT_BASE_URL.into(), "m".into());
        assert!(!format!("{e:?}").contains("co-secret"));
    }
}
