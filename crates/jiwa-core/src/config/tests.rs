use std::io::Write;

use serial_test::serial;

use super::*;
use crate::vault::StaticVaultProvider;

const ENV_KEYS: [&str; 17] = [
    "JIWA_LLM_MODEL",
    "JIWA_LLM_BASE_URL",
    "JIWA_LLM_TEMPERATURE",
    "JIWA_LLM_MAX_OUTPUT_TOKENS",
    "JIWA_EMBEDDING_MODEL",
    "JIWA_EMBEDDING_BASE_URL",
    "JIWA_INDEX_SOURCE",
    "JIWA_INDEX_DIR",
    "JIWA_INDEX_TOP_K",
    "JIWA_SEARCH_RESULTS",
    "JIWA_SEARCH_REGION",
    "JIWA_SEARCH_BASE_URL",
    "JIWA_TIMEOUT_SEARCH",
    "JIWA_TIMEOUT_LLM",
    "JIWA_STREAM_MIN_INTERVAL_MS",
    "JIWA_HISTORY_DIR",
    "JIWA_GEMINI_API_KEY",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn defaults_when_file_missing() {
    let config = Config::default();
    assert_eq!(config.llm.model, "gemini-1.5-flash");
    assert_eq!(config.llm.base_url, jiwa_llm::gemini::DEFAULT_BASE_URL);
    assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.llm.max_output_tokens, 2048);
    assert_eq!(config.embedding.model, "embed-multilingual-v3.0");
    assert_eq!(config.index.source, Path::new("data/Mental_Health_FAQ.csv"));
    assert_eq!(config.index.dir, Path::new("data/faiss_index"));
    assert_eq!(config.index.chunk_size, 1000);
    assert_eq!(config.index.chunk_overlap, 100);
    assert_eq!(config.index.top_k, 3);
    assert_eq!(config.search.results, 10);
    assert_eq!(config.search.timeout_seconds, 120);
    assert_eq!(config.stream.min_interval_ms, 300);
    assert_eq!(config.stream.preview_chars, 200);
    assert_eq!(config.timeouts.llm_seconds, 120);
    assert!(config.secrets.gemini_api_key.is_none());
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn load_missing_file_uses_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("nope.toml")).unwrap();
    assert_eq!(config.llm.model, "gemini-1.5-flash");
    assert_eq!(config.index.top_k, 3);
}

#[test]
#[serial]
fn shipped_config_matches_builtin_defaults() {
    clear_env();
    let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
    let config = Config::load(&shipped).unwrap();
    assert_eq!(
        toml::to_string(&config).unwrap(),
        toml::to_string(&Config::default()).unwrap()
    );
}

#[test]
#[serial]
fn load_partial_file_keeps_other_defaults() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[llm]
model = "gemini-2.0-flash"

[index]
top_k = 5
dir = "/tmp/jiwa-index"
"#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.llm.model, "gemini-2.0-flash");
    assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.index.top_k, 5);
    assert_eq!(config.index.dir, Path::new("/tmp/jiwa-index"));
    assert_eq!(config.index.chunk_size, 1000);
    assert_eq!(config.search.region, "id-id");
}

#[test]
#[serial]
fn load_rejects_malformed_toml() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[llm\nmodel = ").unwrap();
    assert!(Config::load(file.path()).is_err());
}

#[test]
#[serial]
fn env_overrides_file_values() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[index]\ntop_k = 5\n").unwrap();

    unsafe {
        std::env::set_var("JIWA_INDEX_TOP_K", "7");
        std::env::set_var("JIWA_LLM_MODEL", "gemini-pro");
        std::env::set_var("JIWA_SEARCH_REGION", "us-en");
        std::env::set_var("JIWA_TIMEOUT_LLM", "30");
        std::env::set_var("JIWA_HISTORY_DIR", "/tmp/history");
    }
    let config = Config::load(file.path()).unwrap();
    clear_env();

    assert_eq!(config.index.top_k, 7);
    assert_eq!(config.llm.model, "gemini-pro");
    assert_eq!(config.search.region, "us-en");
    assert_eq!(config.timeouts.llm_seconds, 30);
    assert_eq!(config.history.dir, Path::new("/tmp/history"));
}

#[test]
#[serial]
fn invalid_numeric_env_is_ignored() {
    clear_env();
    unsafe {
        std::env::set_var("JIWA_INDEX_TOP_K", "many");
        std::env::set_var("JIWA_LLM_TEMPERATURE", "warm");
    }
    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.index.top_k, 3);
    assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
}

#[tokio::test]
async fn resolve_secrets_populates_keys() {
    let vault = StaticVaultProvider::new()
        .with_secret(GEMINI_KEY_VAR, "AIza-test")
        .with_secret(COHERE_KEY_VAR, "co-test");
    let mut config = Config::default();
    config.resolve_secrets(&vault).await.unwrap();

    assert_eq!(config.require_gemini_key().unwrap().expose(), "AIza-test");
    assert_eq!(
        config.secrets.cohere_api_key.as_ref().map(Secret::expose),
        Some("co-test")
    );
}

#[tokio::test]
async fn missing_keys_fail_with_variable_name() {
    let mut config = Config::default();
    config.resolve_secrets(&StaticVaultProvider::new()).await.unwrap();

    let err = config.require_gemini_key().unwrap_err().to_string();
    assert!(err.contains(GEMINI_KEY_VAR));
    // The embedding key stays optional here; index and retriever report it.
    assert!(config.secrets.cohere_api_key.is_none());
}

#[test]
fn secrets_are_not_serialized() {
    let mut config = Config::default();
    config.secrets.gemini_api_key = Some(Secret::new("AIza-hidden"));
    let rendered = toml::to_string(&config).unwrap();
    assert!(!rendered.contains("AIza-hidden"));
}

#[test]
fn validate_rejects_zero_chunk_size() {
    let mut config = Config::default();
    config.index.chunk_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_overlap_not_below_size() {
    let mut config = Config::default();
    config.index.chunk_overlap = config.index.chunk_size;
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("chunk_overlap"));
}

#[test]
fn validate_rejects_zero_top_k() {
    let mut config = Config::default();
    config.index.top_k = 0;
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_zero_timeouts() {
    let mut config = Config::default();
    config.timeouts.llm_seconds = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.search.timeout_seconds = 0;
    assert!(config.validate().is_err());
}

#[test]
fn durations_follow_settings() {
    let mut config = Config::default();
    config.timeouts.llm_seconds = 5;
    config.search.timeout_seconds = 7;
    assert_eq!(config.llm_timeout(), Duration::from_secs(5));
    assert_eq!(config.search_timeout(), Duration::from_secs(7));
    assert_eq!(config.translate_timeout(), Duration::from_secs(30));
}
