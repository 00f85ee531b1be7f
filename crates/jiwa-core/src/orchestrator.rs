//! Chooses the context for an answer: uploaded document, then index, then the web.

use std::time::Duration;

use jiwa_index::{Retrieval, Searcher};
use jiwa_llm::{LlmError, LlmProvider, Message};
use jiwa_tools::WebSearch;
use jiwa_tools::search::format_results;
use tokio_stream::StreamExt;

use crate::streaming::{PreviewDisplay, StreamController};

pub const WEB_FALLBACK_STATUS: &str =
    "🔍 Jawaban tidak ditemukan di database. Mencoba mencari dari internet...";

/// Receives the live progress of one answer.
pub trait StreamSink {
    fn on_start(&mut self);
    fn on_token(&mut self, token: &str);
    fn on_status(&mut self, text: &str);
}

impl<D: PreviewDisplay> StreamSink for StreamController<D> {
    fn on_start(&mut self) {
        self.start();
    }

    fn on_token(&mut self, token: &str) {
        StreamController::on_token(self, token);
    }

    fn on_status(&mut self, text: &str) {
        self.status(text);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Document,
    Index,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Model output grounded on the given context.
    Generated { text: String, source: AnswerSource },
    /// Formatted web search results, or the "nothing found" notice.
    Web { text: String },
    Failed { message: String, error: String },
}

impl Answer {
    /// Text shown to the user for this answer.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            Self::Generated { text, .. } | Self::Web { text } => text,
            Self::Failed { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    pub top_k: usize,
    pub web_results: usize,
    pub llm_timeout: Duration,
    pub search_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            web_results: 10,
            llm_timeout: Duration::from_secs(120),
            search_timeout: Duration::from_secs(120),
        }
    }
}

impl From<&crate::config::Config> for OrchestratorConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            top_k: config.index.top_k,
            web_results: config.search.results,
            llm_timeout: config.llm_timeout(),
            search_timeout: config.search_timeout(),
        }
    }
}

#[must_use]
pub fn document_prompt(document: &str, query: &str) -> String {
    format!(
        "Kamu adalah asisten kesehatan mental. Berdasarkan dokumen berikut, jawab pertanyaan pengguna:\n\n\
         --- DOKUMEN ---\n{document}\n--- AKHIR DOKUMEN ---\n\nPertanyaan: {query}"
    )
}

#[must_use]
pub fn database_prompt(context: &str, query: &str) -> String {
    format!(
        "Kamu adalah asisten kesehatan mental. Berdasarkan data berikut, jawab pertanyaan pengguna:\n\n\
         --- DATABASE ---\n{context}\n--- AKHIR DATABASE ---\n\nPertanyaan: {query}"
    )
}

pub struct Orchestrator<P, S, W> {
    provider: P,
    searcher: S,
    web: W,
    config: OrchestratorConfig,
}

impl<P: LlmProvider, S: Searcher, W: WebSearch> Orchestrator<P, S, W> {
    #[must_use]
    pub fn new(provider: P, searcher: S, web: W) -> Self {
        Self {
            provider,
            searcher,
            web,
            config: OrchestratorConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn searcher(&self) -> &S {
        &self.searcher
    }

    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Answer `query`, preferring `document` over the index and the index over the web.
    pub async fn answer<K: StreamSink>(
        &self,
        query: &str,
        document: Option<&str>,
        sink: &mut K,
    ) -> Answer {
        if let Some(document) = document {
            tracing::debug!(chars = document.len(), "answering from uploaded document");
            let prompt = document_prompt(document, query);
            return self.generate(&prompt, AnswerSource::Document, sink).await;
        }

        let context = self.index_context(query).await;
        if !context.trim().is_empty() {
            let prompt = database_prompt(&context, query);
            return self.generate(&prompt, AnswerSource::Index, sink).await;
        }

        sink.on_status(WEB_FALLBACK_STATUS);
        self.web_answer(query).await
    }

    async fn index_context(&self, query: &str) -> String {
        let hits = match self.searcher.search(query, self.config.top_k).await {
            Ok(Retrieval::Failed(reason)) => {
                tracing::warn!("index search failed, falling back to web: {reason}");
                Vec::new()
            }
            Ok(retrieval) => retrieval.into_hits(),
            Err(e) => {
                tracing::warn!("index search rejected: {e}");
                Vec::new()
            }
        };
        tracing::debug!(hits = hits.len(), "index search done");
        hits.iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn generate<K: StreamSink>(
        &self,
        prompt: &str,
        source: AnswerSource,
        sink: &mut K,
    ) -> Answer {
        sink.on_start();
        let messages = [Message::user(prompt)];
        let result = tokio::time::timeout(self.config.llm_timeout, async {
            let mut stream = self.provider.chat_stream(&messages).await?;
            let mut text = String::new();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                sink.on_token(&chunk);
                text.push_str(&chunk);
            }
            Ok::<_, LlmError>(text)
        })
        .await;

        match result {
            Ok(Ok(text)) => Answer::Generated { text, source },
            Ok(Err(e)) => {
                tracing::error!(provider = self.provider.name(), "generation failed: {e}");
                generation_failed(e.to_string())
            }
            Err(_) => {
                let secs = self.config.llm_timeout.as_secs();
                tracing::error!(provider = self.provider.name(), "generation timed out after {secs}s");
                generation_failed(format!("LLM call timed out after {secs}s"))
            }
        }
    }

    async fn web_answer(&self, query: &str) -> Answer {
        let result = tokio::time::timeout(
            self.config.search_timeout,
            self.web.search(query, self.config.web_results),
        )
        .await;

        let error = match result {
            Ok(Ok(urls)) => {
                tracing::info!(results = urls.len(), "web search fallback done");
                return Answer::Web {
                    text: format_results(query, &urls),
                };
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "web search timed out after {}s",
                self.config.search_timeout.as_secs()
            ),
        };
        tracing::warn!("web search failed: {error}");
        Answer::Failed {
            message: format!("Terjadi kesalahan saat melakukan pencarian internet: {error}"),
            error,
        }
    }
}

fn generation_failed(error: String) -> Answer {
    Answer::Failed {
        message: format!("❌ Terjadi kesalahan: {error}"),
        error,
    }
}
