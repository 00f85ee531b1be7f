use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::analysis::{contains_keyword, generate_summary, highlight, summarize_page};
use crate::error::DocumentError;
use crate::extraction::{Extraction, ExtractionStrategy, PageWisePdf, WholeDocumentPdf};

/// Default maximum upload size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedDocument {
    pub filename: String,
    pub full_text: String,
    /// 1-based page number → summary of its keyword-bearing sentences.
    /// Present only for page-aware extractions with at least one relevant page.
    pub relevant_pages: Option<BTreeMap<usize, String>>,
    /// Present under the same condition as `relevant_pages`.
    pub highlighted_text: Option<String>,
    pub summary: String,
    /// Name of the strategy that produced the text.
    pub strategy: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessedDocument {
    Success(AnalyzedDocument),
    Failed { error: String },
}

impl ProcessedDocument {
    fn failed(cause: impl std::fmt::Display) -> Self {
        Self::Failed {
            error: format!("Gagal memproses PDF: {cause}"),
        }
    }
}

pub struct DocumentProcessor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    max_file_size: u64,
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(vec![Box::new(PageWisePdf), Box::new(WholeDocumentPdf)])
    }
}

impl std::fmt::Debug for DocumentProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("DocumentProcessor")
            .field("strategies", &names)
            .field("max_file_size", &self.max_file_size)
            .finish()
    }
}

impl DocumentProcessor {
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self {
            strategies,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Extract and analyze `bytes`. Never fails: errors become
    /// [`ProcessedDocument::Failed`].
    #[must_use]
    pub fn process(&self, filename: &str, bytes: &[u8]) -> ProcessedDocument {
        let size = bytes.len() as u64;
        if size > self.max_file_size {
            return ProcessedDocument::failed(DocumentError::FileTooLarge(size));
        }

        let mut last_error = None;
        for strategy in &self.strategies {
            match strategy.extract(bytes) {
                Ok(extraction) => {
                    tracing::info!(filename, strategy = strategy.name(), "document extracted");
                    return ProcessedDocument::Success(analyze(
                        filename,
                        strategy.name(),
                        extraction,
                    ));
                }
                Err(e) => {
                    tracing::warn!(filename, strategy = strategy.name(), "extraction failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => ProcessedDocument::failed(e),
            None => ProcessedDocument::failed("no extraction strategy configured"),
        }
    }

    /// Read a `.pdf` file and [`process`](Self::process) it on the blocking pool.
    pub async fn process_file(self: &Arc<Self>, path: &Path) -> ProcessedDocument {
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return ProcessedDocument::failed(DocumentError::UnsupportedFormat(
                path.display().to_string(),
            ));
        }

        let meta = match tokio::fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) => return ProcessedDocument::failed(DocumentError::Io(e)),
        };
        if meta.len() > self.max_file_size {
            return ProcessedDocument::failed(DocumentError::FileTooLarge(meta.len()));
        }
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => return ProcessedDocument::failed(DocumentError::Io(e)),
        };

        let filename = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let processor = Arc::clone(self);
        tokio::task::spawn_blocking(move || processor.process(&filename, &bytes))
            .await
            .unwrap_or_else(ProcessedDocument::failed)
    }
}

fn analyze(filename: &str, strategy: &str, extraction: Extraction) -> AnalyzedDocument {
    let (full_text, relevant_pages) = match extraction {
        Extraction::Pages(pages) => {
            let mut full_text = String::new();
            let mut relevant = BTreeMap::new();
            for (i, page) in pages.iter().enumerate() {
                if page.is_empty() {
                    continue;
                }
                full_text.push_str(page);
                full_text.push('\n');
                if contains_keyword(page) {
                    relevant.insert(i + 1, summarize_page(page));
                }
            }
            (full_text, (!relevant.is_empty()).then_some(relevant))
        }
        Extraction::Whole(text) => (text, None),
    };

    let highlighted_text = relevant_pages.as_ref().map(|_| highlight(&full_text));
    let summary = generate_summary(&full_text);
    tracing::debug!(
        filename,
        chars = full_text.chars().count(),
        relevant_pages = relevant_pages.as_ref().map_or(0, BTreeMap::len),
        "document analyzed"
    );

    AnalyzedDocument {
        filename: filename.to_owned(),
        full_text,
        relevant_pages,
        highlighted_text,
        summary,
        strategy: strategy.to_owned(),
    }
}
