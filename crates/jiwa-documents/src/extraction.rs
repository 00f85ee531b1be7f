//! Pluggable text extraction. A processor tries its strategies in order and
//! keeps the first success.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::DocumentError;

/// Text recovered from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// One entry per page, in page order. Empty pages are kept as empty strings.
    Pages(Vec<String>),
    Whole(String),
}

pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Returns an error if the bytes cannot be parsed by this strategy.
    fn extract(&self, bytes: &[u8]) -> Result<Extraction, DocumentError>;
}

/// Per-page extraction through `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageWisePdf;

impl ExtractionStrategy for PageWisePdf {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "page-wise"
    }

    fn extract(&self, bytes: &[u8]) -> Result<Extraction, DocumentError> {
        guarded(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
            .map(Extraction::Pages)
    }
}

/// Whole-document extraction through `pdf-extract`, without page breakdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct WholeDocumentPdf;

impl ExtractionStrategy for WholeDocumentPdf {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "whole-document"
    }

    fn extract(&self, bytes: &[u8]) -> Result<Extraction, DocumentError> {
        guarded(|| pdf_extract::extract_text_from_mem(bytes)).map(Extraction::Whole)
    }
}

// pdf-extract panics on some malformed inputs.
fn guarded<T, E: std::fmt::Display>(
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, DocumentError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(DocumentError::Pdf(e.to_string())),
        Err(_) => Err(DocumentError::Pdf("parser panicked".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_wise_rejects_garbage() {
        assert!(PageWisePdf.extract(b"definitely not a pdf").is_err());
    }

    #[test]
    fn whole_document_rejects_garbage() {
        assert!(WholeDocumentPdf.extract(b"%PDF-broken").is_err());
    }

    #[test]
    fn guarded_converts_panic() {
        let result: Result<(), DocumentError> = guarded::<(), String>(|| panic!("boom"));
        assert!(matches!(result, Err(DocumentError::Pdf(msg)) if msg == "parser panicked"));
    }

    #[test]
    fn strategy_names() {
        assert_eq!(PageWisePdf.name(), "page-wise");
        assert_eq!(WholeDocumentPdf.name(), "whole-document");
    }
}
