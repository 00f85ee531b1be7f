//! Best-effort conversation export.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use jiwa_llm::Message;

#[must_use]
pub fn history_filename<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("chat_history_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Write `messages` as a pretty JSON array of `{role, content}` into `dir`.
///
/// Failures are logged and yield `None`; they never interrupt the caller.
pub async fn save_history(messages: &[Message], dir: &Path) -> Option<PathBuf> {
    match write_history(messages, dir).await {
        Ok(path) => {
            tracing::info!(path = %path.display(), messages = messages.len(), "chat history saved");
            Some(path)
        }
        Err(e) => {
            tracing::warn!(dir = %dir.display(), "error saving chat history: {e}");
            None
        }
    }
}

async fn write_history(messages: &[Message], dir: &Path) -> Result<PathBuf, crate::ToolError> {
    let json = serde_json::to_string_pretty(messages)?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(history_filename(&Local::now()));
    tokio::fs::write(&path, json).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn filename_uses_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(history_filename(&at), "chat_history_20240102_030405.json");
    }

    #[tokio::test]
    async fn writes_role_content_array() {
        let dir = tempfile::tempdir().unwrap();
        let messages = vec![Message::assistant("Halo!"), Message::user("Apa itu stres?")];

        let path = save_history(&messages, dir.path()).await.unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"role": "assistant", "content": "Halo!"},
                {"role": "user", "content": "Apa itu stres?"}
            ])
        );
        assert!(raw.contains("\n  {"), "expected two-space indentation");
    }

    #[tokio::test]
    async fn unwritable_directory_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        assert!(save_history(&[], &blocker.join("sub")).await.is_none());
    }
}
