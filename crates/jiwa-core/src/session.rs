//! Per-conversation state: message history and the uploaded document.

use jiwa_llm::{Message, Role};

pub const GREETING: &str = "Halo! Saya adalah Asisten Kesehatan Mental AI Anda.

**Apa yang bisa saya bantu?**

Anda bisa bertanya tentang data kesehatan mental umum dari database kami, seperti:
* `Apa statistik depresi di Indonesia?`
* `Bagaimana cara mengatasi kecemasan?`
* `Berikan rekomendasi untuk meningkatkan kesehatan mental.`

**Anda juga bisa mengunggah dokumen kesehatan mental (PDF) dengan perintah `/upload <file.pdf>`.** Setelah diunggah, Anda bisa langsung bertanya tentang isinya, misalnya:
* `Apa rekomendasi dari dokumen ini?`
* `Sebutkan semua terapi yang dianjurkan dalam file tersebut.`
";

pub const RESET_NOTICE: &str =
    "Riwayat chat dan dokumen telah dihapus. Silakan mulai percakapan baru.";

pub const EMPTY_HISTORY: &str = "Belum ada percakapan.";

const HISTORY_PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub filename: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    messages: Vec<Message>,
    document: Option<UploadedDocument>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Fresh session opening with the assistant greeting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            document: None,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn push_system(&mut self, content: impl Into<String>) {
        self.messages.push(Message::system(content));
    }

    /// Remove and return the most recent message.
    pub fn pop_last(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    #[must_use]
    pub fn document(&self) -> Option<&UploadedDocument> {
        self.document.as_ref()
    }

    #[must_use]
    pub fn document_text(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.text.as_str())
    }

    /// Replace the uploaded document.
    pub fn set_document(&mut self, filename: impl Into<String>, text: impl Into<String>) {
        self.document = Some(UploadedDocument {
            filename: filename.into(),
            text: text.into(),
        });
    }

    #[must_use]
    pub fn is_current_document(&self, filename: &str) -> bool {
        self.document.as_ref().is_some_and(|d| d.filename == filename)
    }

    /// Drop history and document, leaving only the reset notice.
    pub fn reset(&mut self) {
        self.messages = vec![Message::assistant(RESET_NOTICE)];
        self.document = None;
    }

    /// One line per non-system message, each content cut to 40 characters.
    #[must_use]
    pub fn history_lines(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let who = if m.role == Role::User { "Anda" } else { "AI" };
                let preview: String = m.content.chars().take(HISTORY_PREVIEW_CHARS).collect();
                format!("{who}: {preview}...")
            })
            .collect()
    }

    #[must_use]
    pub fn history_overview(&self) -> String {
        let lines = self.history_lines();
        if lines.is_empty() {
            EMPTY_HISTORY.to_owned()
        } else {
            lines.join("\n")
        }
    }
}
