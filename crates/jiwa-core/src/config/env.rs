use std::path::PathBuf;

use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("JIWA_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("JIWA_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("JIWA_LLM_TEMPERATURE") {
            match v.parse::<f32>() {
                Ok(t) => self.llm.temperature = t,
                Err(_) => tracing::warn!("ignoring invalid JIWA_LLM_TEMPERATURE value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("JIWA_LLM_MAX_OUTPUT_TOKENS")
            && let Ok(n) = v.parse::<u32>()
        {
            self.llm.max_output_tokens = n;
        }
        if let Ok(v) = std::env::var("JIWA_EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Ok(v) = std::env::var("JIWA_EMBEDDING_BASE_URL") {
            self.embedding.base_url = v;
        }
        if let Ok(v) = std::env::var("JIWA_INDEX_SOURCE") {
            self.index.source = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("JIWA_INDEX_DIR") {
            self.index.dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("JIWA_INDEX_TOP_K")
            && let Ok(k) = v.parse::<usize>()
        {
            self.index.top_k = k;
        }
        if let Ok(v) = std::env::var("JIWA_SEARCH_RESULTS")
            && let Ok(n) = v.parse::<usize>()
        {
            self.search.results = n;
        }
        if let Ok(v) = std::env::var("JIWA_SEARCH_REGION") {
            self.search.region = v;
        }
        if let Ok(v) = std::env::var("JIWA_SEARCH_BASE_URL") {
            self.search.base_url = v;
        }
        if let Ok(v) = std::env::var("JIWA_TIMEOUT_SEARCH")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.search.timeout_seconds = secs;
        }
        if let Ok(v) = std::env::var("JIWA_TIMEOUT_LLM")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.llm_seconds = secs;
        }
        if let Ok(v) = std::env::var("JIWA_STREAM_MIN_INTERVAL_MS")
            && let Ok(ms) = v.parse::<u64>()
        {
            self.stream.min_interval_ms = ms;
        }
        if let Ok(v) = std::env::var("JIWA_HISTORY_DIR") {
            self.history.dir = PathBuf::from(v);
        }
    }
}
