use serde::Serialize;
use std::path::PathBuf;

/// Process-wide configuration. Built once at startup, read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Absolute URL of the UI, used to build permalinks
    pub public_base_url: String,
    /// Optional JSON file replacing the embedded corpus
    pub corpus_path: Option<PathBuf>,
    /// Name used in copied citations
    pub corpus_name: String,
    /// Search pipeline tuning
    pub search: SearchConfig,
    /// Remote knowledge base configuration
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before the remote call fires
    pub debounce_ms: u64,
    /// Queries shorter than this (in chars, after trimming) stay local
    pub min_remote_query_chars: usize,
    /// Upper bound on paragraphs requested from the remote service
    pub max_remote_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 800,
            min_remote_query_chars: 3,
            max_remote_results: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmConfig {
    /// "gemini", "openai" or "ollama"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// API key (not needed for a local ollama)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds (capped at 120)
    pub timeout_secs: u64,
    /// When false the remote augmenter is never contacted
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".to_string(),
            public_base_url: "http://127.0.0.1:9000/".to_string(),
            corpus_path: None,
            corpus_name: "Catecismo da Igreja Católica".to_string(),
            search: SearchConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            base_url: default_base_url("gemini").to_string(),
            model: default_model("gemini").to_string(),
            api_key: None,
            timeout_secs: 30,
            enabled: true,
        }
    }
}

/// Default API root for a provider.
pub fn default_base_url(provider: &str) -> &'static str {
    match provider {
        "openai" => "https://api.openai.com",
        "ollama" => "http://localhost:11434",
        _ => "https://generativelanguage.googleapis.com",
    }
}

/// Default model for a provider.
pub fn default_model(provider: &str) -> &'static str {
    match provider {
        "openai" => "gpt-4o-mini",
        "ollama" => "llama3.1",
        _ => "gemini-2.5-flash",
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("CATECISMO_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(url) = lookup("CATECISMO_PUBLIC_URL") {
            config.public_base_url = url;
        }
        if let Some(path) = lookup("CATECISMO_CORPUS_PATH") {
            config.corpus_path = Some(PathBuf::from(path));
        }
        if let Some(name) = lookup("CATECISMO_CORPUS_NAME") {
            config.corpus_name = name;
        }

        if let Some(val) = lookup("CATECISMO_DEBOUNCE_MS") {
            if let Ok(v) = val.parse() {
                config.search.debounce_ms = v;
            }
        }
        if let Some(val) = lookup("CATECISMO_MIN_REMOTE_CHARS") {
            if let Ok(v) = val.parse() {
                config.search.min_remote_query_chars = v;
            }
        }
        if let Some(val) = lookup("CATECISMO_MAX_REMOTE_RESULTS") {
            if let Ok(v) = val.parse::<usize>() {
                config.search.max_remote_results = v.clamp(6, 8);
            }
        }

        if let Some(provider) = lookup("LLM_PROVIDER") {
            config.llm.provider = provider.to_lowercase();
            config.llm.base_url = default_base_url(&config.llm.provider).to_string();
            config.llm.model = default_model(&config.llm.provider).to_string();
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("LLM_MODEL") {
            config.llm.model = model;
        }
        config.llm.api_key = lookup("LLM_API_KEY").or_else(|| lookup("GEMINI_API_KEY"));
        if let Some(val) = lookup("LLM_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.llm.timeout_secs = v.min(120);
            }
        }
        if let Some(val) = lookup("CATECISMO_OFFLINE") {
            if matches!(val.as_str(), "1" | "true" | "yes") {
                config.llm.enabled = false;
            }
        }

        config
    }
}
