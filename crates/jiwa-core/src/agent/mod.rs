pub mod commands;
pub mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use jiwa_documents::{DocumentProcessor, ProcessedDocument};
use jiwa_index::Searcher;
use jiwa_llm::LlmProvider;
use jiwa_tools::{Language, Translator, WebSearch};

use crate::channel::{Channel, ChannelPreview};
use crate::config::StreamConfig;
use crate::orchestrator::{Answer, Orchestrator};
use crate::session::{RESET_NOTICE, Session};
use crate::streaming::{Clock, StreamController, SystemClock};

use self::commands::{Command, HELP};
use self::error::AgentError;

const UPLOAD_STATUS: &str = "Memproses dokumen...";
const UPLOAD_OK: &str = "Dokumen berhasil diproses!";
const UPLOAD_EMPTY: &str = "Gagal memproses PDF: tidak ada teks yang dapat dibaca dari dokumen.";
const SAVE_FAILED: &str = "Gagal menyimpan riwayat percakapan.";

pub struct Agent<C, P, S, W> {
    channel: C,
    orchestrator: Orchestrator<P, S, W>,
    session: Session,
    processor: Arc<DocumentProcessor>,
    translator: Translator,
    history_dir: PathBuf,
    clock: Arc<dyn Clock>,
    min_interval: Duration,
    preview_chars: usize,
}

impl<C: Channel, P: LlmProvider, S: Searcher, W: WebSearch> Agent<C, P, S, W> {
    #[must_use]
    pub fn new(channel: C, orchestrator: Orchestrator<P, S, W>) -> Self {
        let stream = StreamConfig::default();
        Self {
            channel,
            orchestrator,
            session: Session::new(),
            processor: Arc::new(DocumentProcessor::default()),
            translator: Translator::new(jiwa_tools::translate::DEFAULT_BASE_URL, Duration::from_secs(30)),
            history_dir: PathBuf::from("."),
            clock: Arc::new(SystemClock),
            min_interval: Duration::from_millis(stream.min_interval_ms),
            preview_chars: stream.preview_chars,
        }
    }

    #[must_use]
    pub fn with_processor(mut self, processor: DocumentProcessor) -> Self {
        self.processor = Arc::new(processor);
        self
    }

    #[must_use]
    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = translator;
        self
    }

    #[must_use]
    pub fn with_history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_stream_config(mut self, stream: &StreamConfig) -> Self {
        self.min_interval = Duration::from_millis(stream.min_interval_ms);
        self.preview_chars = stream.preview_chars;
        self
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Greet, then serve user lines until EOF or exit.
    ///
    /// # Errors
    ///
    /// Returns an error if channel I/O fails.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        if let Some(greeting) = self.session.messages().first() {
            let greeting = greeting.content.clone();
            self.channel.send(&greeting).await?;
        }

        while let Some(text) = self.channel.recv().await? {
            if text.trim().is_empty() {
                continue;
            }
            self.process_input(&text).await?;
        }

        tracing::info!("chat session ended");
        Ok(())
    }

    /// Handle one user line: a slash command or a question.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel fails, including while reporting a
    /// failed turn.
    pub async fn process_input(&mut self, text: &str) -> Result<(), AgentError> {
        let trimmed = text.trim();
        match Command::parse(trimmed) {
            Some(command) => self.handle_command(command).await,
            None => self.handle_question(trimmed).await,
        }
    }

    async fn handle_question(&mut self, query: &str) -> Result<(), AgentError> {
        self.session.push_user(query);
        if let Err(e) = self.respond(query).await {
            tracing::error!("response processing failed: {e:#}");
            self.session.pop_last();
            self.channel
                .send(&format!("Maaf, terjadi kesalahan fatal: {e}"))
                .await?;
        }
        Ok(())
    }

    async fn respond(&mut self, query: &str) -> Result<(), AgentError> {
        let reply = {
            let preview = ChannelPreview::new(&mut self.channel);
            let mut controller = StreamController::new(preview, Arc::clone(&self.clock))
                .with_min_interval(self.min_interval)
                .with_preview_chars(self.preview_chars);
            let answer = self
                .orchestrator
                .answer(query, self.session.document_text(), &mut controller)
                .await;
            match answer {
                Answer::Generated { source, .. } => {
                    tracing::info!(?source, redraws = controller.redraws(), "answer generated");
                    controller.finish()
                }
                Answer::Web { text } => text,
                Answer::Failed { message, error } => {
                    tracing::warn!("answer failed: {error}");
                    controller.abort();
                    message
                }
            }
        };

        self.channel.send(&reply).await?;
        self.session.push_assistant(reply);
        Ok(())
    }

    async fn handle_command(&mut self, command: Command) -> Result<(), AgentError> {
        match command {
            Command::Upload(path) => self.handle_upload(&path).await?,
            Command::History => {
                let overview = self.session.history_overview();
                self.channel.send(&overview).await?;
            }
            Command::Reset => {
                self.session.reset();
                tracing::info!("session reset");
                self.channel.send(RESET_NOTICE).await?;
            }
            Command::Save => self.handle_save().await?,
            Command::Tips => self.reply_with_tool(jiwa_tools::coping::coping_tips()).await?,
            Command::Pro(query) => {
                let text = jiwa_tools::professional::professional_help(
                    query.as_deref(),
                    Some(self.orchestrator.searcher()),
                )
                .await;
                self.reply_with_tool(text).await?;
            }
            Command::Date => {
                self.reply_with_tool(jiwa_tools::date::current_date_message())
                    .await?;
            }
            Command::Translate(lang, text) => self.handle_translate(lang, &text).await?,
            Command::Help => self.channel.send(HELP).await?,
            Command::Invalid(usage) => self.channel.send(usage).await?,
            Command::Unknown(name) => {
                self.channel
                    .send(&format!(
                        "Perintah tidak dikenal: {name}. Ketik /help untuk daftar perintah."
                    ))
                    .await?;
            }
        }
        Ok(())
    }

    async fn reply_with_tool(&mut self, text: String) -> Result<(), AgentError> {
        self.channel.send(&text).await?;
        self.session.push_assistant(text);
        Ok(())
    }

    async fn handle_translate(&mut self, lang: Language, text: &str) -> Result<(), AgentError> {
        self.channel.send_status("Menerjemahkan...").await?;
        let translated = self.translator.translate(text, lang).await;
        self.reply_with_tool(translated).await
    }

    async fn handle_upload(&mut self, path: &Path) -> Result<(), AgentError> {
        let filename = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        if self.session.is_current_document(&filename) {
            tracing::debug!(filename = %filename, "document already loaded, skipping");
            self.channel
                .send(&format!("Dokumen '{filename}' sudah diproses."))
                .await?;
            return Ok(());
        }

        self.channel.send_status(UPLOAD_STATUS).await?;
        match self.processor.process_file(path).await {
            ProcessedDocument::Success(doc) if !doc.full_text.trim().is_empty() => {
                let mut reply = format!("{UPLOAD_OK}\n\n{}", doc.summary);
                if let Some(pages) = &doc.relevant_pages {
                    reply.push_str(&relevant_pages_line(pages.keys()));
                }
                tracing::info!(
                    filename = %filename,
                    strategy = %doc.strategy,
                    chars = doc.full_text.len(),
                    "document loaded"
                );
                self.session.set_document(&filename, doc.full_text);
                self.session.push_system(format!(
                    "Dokumen '{filename}' telah diunggah. Anda sekarang bisa bertanya mengenai isinya."
                ));
                self.channel.send(&reply).await?;
            }
            ProcessedDocument::Success(_) => {
                tracing::warn!(filename = %filename, "document has no extractable text");
                self.channel.send(UPLOAD_EMPTY).await?;
            }
            ProcessedDocument::Failed { error } => {
                tracing::warn!(filename = %filename, "document processing failed: {error}");
                self.channel.send(&error).await?;
            }
        }
        Ok(())
    }

    async fn handle_save(&mut self) -> Result<(), AgentError> {
        let saved =
            jiwa_tools::history::save_history(self.session.messages(), &self.history_dir).await;
        match saved {
            Some(path) => {
                self.channel
                    .send(&format!("Riwayat percakapan disimpan ke {}", path.display()))
                    .await?;
            }
            None => self.channel.send(SAVE_FAILED).await?,
        }
        Ok(())
    }
}

fn relevant_pages_line<'a>(pages: impl Iterator<Item = &'a usize>) -> String {
    let numbers: Vec<String> = pages.map(ToString::to_string).collect();
    format!("\n\nHalaman relevan: {}", numbers.join(", "))
}
