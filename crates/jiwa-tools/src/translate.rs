//! Translation through the public Google Translate endpoint.

use std::time::Duration;

use url::Url;

use crate::error::ToolError;

pub const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";
pub const TRANSLATION_FAILED: &str = "Translation failed after multiple attempts.";
const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Indonesian,
    English,
}

impl Language {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Indonesian => "id",
            Self::English => "en",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "id" => Some(Self::Indonesian),
            "en" => Some(Self::English),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Translator {
    client: reqwest::Client,
    base_url: String,
    base_delay: Duration,
}

impl Translator {
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            base_delay: BASE_DELAY,
        }
    }

    /// Pause between failed attempts.
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Translate `text` into `target`. Empty input yields empty output. After
    /// three failed attempts the fixed [`TRANSLATION_FAILED`] text is returned.
    pub async fn translate(&self, text: &str, target: Language) -> String {
        if text.is_empty() {
            return String::new();
        }

        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_translate(text, target).await {
                Ok(translated) => return translated,
                Err(e) => {
                    tracing::warn!(attempt, "translation failed: {e}");
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(self.base_delay).await;
                    }
                }
            }
        }
        TRANSLATION_FAILED.to_owned()
    }

    async fn try_translate(&self, text: &str, target: Language) -> Result<String, ToolError> {
        let url = Url::parse_with_params(
            &format!("{}/translate_a/single", self.base_url.trim_end_matches('/')),
            &[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| ToolError::Parse(format!("invalid translate URL: {e}")))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Status {
                service: "translate",
                status: status.as_u16(),
            });
        }
        let body: serde_json::Value = response.json().await?;
        parse_translation(&body)
    }
}

/// The endpoint answers `[[["translated", "source", ...], ...], ...]`; the
/// translation is the concatenation of every segment's first element.
fn parse_translation(body: &serde_json::Value) -> Result<String, ToolError> {
    let segments = body
        .get(0)
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| ToolError::Parse("missing translation segments".into()))?;
    let text: String = segments
        .iter()
        .filter_map(|s| s.get(0).and_then(serde_json::Value::as_str))
        .collect();
    if text.is_empty() {
        return Err(ToolError::Parse("empty translation".into()));
    }
    Ok(text)
}
