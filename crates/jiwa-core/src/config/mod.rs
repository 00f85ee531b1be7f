mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};

use crate::vault::{Secret, VaultProvider};

pub const GEMINI_KEY_VAR: &str = "JIWA_GEMINI_API_KEY";
pub const COHERE_KEY_VAR: &str = "JIWA_COHERE_API_KEY";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Resolve API keys through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> anyhow::Result<()> {
        if let Some(key) = vault.get_secret(GEMINI_KEY_VAR).await? {
            self.secrets.gemini_api_key = Some(key);
        }
        if let Some(key) = vault.get_secret(COHERE_KEY_VAR).await? {
            self.secrets.cohere_api_key = Some(key);
        }
        Ok(())
    }

    /// Reject values that would make indexing or chatting misbehave.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.index.chunk_size == 0 {
            bail!("index.chunk_size must be greater than 0");
        }
        if self.index.chunk_overlap >= self.index.chunk_size {
            bail!(
                "index.chunk_overlap ({}) must be smaller than index.chunk_size ({})",
                self.index.chunk_overlap,
                self.index.chunk_size
            );
        }
        if self.index.top_k == 0 {
            bail!("index.top_k must be greater than 0");
        }
        if self.search.results == 0 {
            bail!("search.results must be greater than 0");
        }
        if self.timeouts.llm_seconds == 0 {
            bail!("timeouts.llm_seconds must be greater than 0");
        }
        if self.search.timeout_seconds == 0 {
            bail!("search.timeout_seconds must be greater than 0");
        }
        if self.translate.timeout_seconds == 0 {
            bail!("translate.timeout_seconds must be greater than 0");
        }
        if self.stream.preview_chars == 0 {
            bail!("stream.preview_chars must be greater than 0");
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error when no Gemini API key was resolved.
    pub fn require_gemini_key(&self) -> anyhow::Result<&Secret> {
        self.secrets
            .gemini_api_key
            .as_ref()
            .with_context(|| format!("{GEMINI_KEY_VAR} is not set; the chat model cannot be reached"))
    }

    #[must_use]
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.llm_seconds)
    }

    #[must_use]
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search.timeout_seconds)
    }

    #[must_use]
    pub fn translate_timeout(&self) -> Duration {
        Duration::from_secs(self.translate.timeout_seconds)
    }
}
