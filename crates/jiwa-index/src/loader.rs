//! Tabular knowledge-base loader.

use std::path::Path;

use crate::error::{IndexError, Result};
use crate::types::Document;

/// Load a CSV file, producing one [`Document`] per data row.
///
/// Every cell of a row is joined with a single space; empty cells contribute
/// empty strings. Rows whose joined text is blank are skipped.
///
/// # Errors
///
/// Returns [`IndexError::MissingSource`] if the file does not exist, or a CSV
/// error if it cannot be parsed.
pub fn load_csv(path: &Path) -> Result<Vec<Document>> {
    if !path.exists() {
        return Err(IndexError::MissingSource(path.to_path_buf()));
    }

    let source = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut documents = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let content = record.iter().collect::<Vec<_>>().join(" ");
        if content.trim().is_empty() {
            tracing::debug!(row, "skipping blank row");
            continue;
        }
        documents.push(Document {
            content,
            source: source.clone(),
            row,
        });
    }

    tracing::info!(path = %source, rows = documents.len(), "loaded knowledge base");
    Ok(documents)
}
