//! API key lookup. Keys never appear in logs or serialized config.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

pub type SecretFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Option<Secret>>> + Send + 'a>>;

/// An API key. Formatting prints a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Where API keys come from.
pub trait VaultProvider: Send + Sync {
    /// Look up `name`; `Ok(None)` when it is not configured.
    fn get_secret<'a>(&'a self, name: &'a str) -> SecretFuture<'a>;
}

/// Process environment. Blank values count as unset so an exported empty
/// variable still produces the "missing key" error.
pub struct EnvVaultProvider;

impl VaultProvider for EnvVaultProvider {
    fn get_secret<'a>(&'a self, name: &'a str) -> SecretFuture<'a> {
        let value = std::env::var(name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Secret::new);
        Box::pin(std::future::ready(Ok(value)))
    }
}

/// Fixed in-memory keys.
#[derive(Default)]
pub struct StaticVaultProvider {
    secrets: HashMap<String, Secret>,
}

impl StaticVaultProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_secret(mut self, name: &str, value: &str) -> Self {
        self.secrets.insert(name.to_owned(), Secret::new(value));
        self
    }
}

impl VaultProvider for StaticVaultProvider {
    fn get_secret<'a>(&'a self, name: &'a str) -> SecretFuture<'a> {
        Box::pin(std::future::ready(Ok(self.secrets.get(name).cloned())))
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn secret_formatting_hides_value() {
        let secret = Secret::new("AIza-key");
        assert_eq!(format!("{secret:?}"), "Secret(***)");
        assert_eq!(secret.to_string(), "***");
        assert_eq!(secret.expose(), "AIza-key");
    }

    #[tokio::test]
    #[serial]
    async fn env_vault_reads_variable() {
        let name = "JIWA_TEST_VAULT_SECRET_SET";
        unsafe { std::env::set_var(name, "test-value") };
        let found = EnvVaultProvider.get_secret(name).await.unwrap();
        unsafe { std::env::remove_var(name) };
        assert_eq!(found, Some(Secret::new("test-value")));
    }

    #[tokio::test]
    #[serial]
    async fn env_vault_treats_blank_as_unset() {
        let name = "JIWA_TEST_VAULT_SECRET_BLANK";
        unsafe { std::env::set_var(name, "  ") };
        let found = EnvVaultProvider.get_secret(name).await.unwrap();
        unsafe { std::env::remove_var(name) };
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn static_vault_returns_configured_secret() {
        let vault = StaticVaultProvider::new().with_secret("API_KEY", "secret-123");
        assert_eq!(
            vault.get_secret("API_KEY").await.unwrap().map(|s| s.expose().to_owned()),
            Some("secret-123".to_owned())
        );
        assert!(vault.get_secret("MISSING").await.unwrap().is_none());
    }
}
