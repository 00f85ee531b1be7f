use serde::{Deserialize, Serialize};

/// One row of the knowledge base, flattened into a single text blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub source: String,
    /// Zero-based data row number (header excluded).
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub source: String,
    pub row: usize,
    pub chunk_index: usize,
}

impl Chunk {
    /// Stable identifier derived from origin and content.
    #[must_use]
    pub fn id(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.source.as_bytes());
        hasher.update(&self.row.to_le_bytes());
        hasher.update(&self.chunk_index.to_le_bytes());
        hasher.update(self.content.as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str, row: usize) -> Chunk {
        Chunk {
            content: content.into(),
            source: "data.csv".into(),
            row,
            chunk_index: 0,
        }
    }

    #[test]
    fn id_is_stable() {
        assert_eq!(chunk("a", 1).id(), chunk("a", 1).id());
        assert_eq!(chunk("a", 1).id().len(), 64);
    }

    #[test]
    fn id_depends_on_row_and_content() {
        assert_ne!(chunk("a", 1).id(), chunk("a", 2).id());
        assert_ne!(chunk("a", 1).id(), chunk("b", 1).id());
    }
}
