//! Uploaded-document handling: text extraction and keyword analysis.

pub mod analysis;
pub mod error;
pub mod extraction;
pub mod processor;

pub use error::DocumentError;
pub use extraction::{Extraction, ExtractionStrategy, PageWisePdf, WholeDocumentPdf};
pub use processor::{AnalyzedDocument, DEFAULT_MAX_FILE_SIZE, DocumentProcessor, ProcessedDocument};
