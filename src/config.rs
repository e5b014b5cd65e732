// src/config.rs
use log::debug;
use std::env;

/// Runtime configuration for a reconciliation run, sourced from the
/// environment with CLI overrides applied on top.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// API key sent to the model service. Empty means unauthenticated, which
    /// only works against local stand-ins.
    pub openai_api_key: String,
    /// Base URL of the model service.
    pub openai_base_url: String,
    /// Chat model identifier.
    pub model: String,
    /// Records per worker chunk.
    pub batch_size: usize,
    /// Records per model prompt within a chunk.
    pub llm_batch_size: usize,
    /// Concurrent matching workers.
    pub num_workers: usize,
    /// Path of the persistent comparison cache.
    pub cache_file: String,
    /// Extra per-record logging.
    pub debug: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            batch_size: 1000,
            llm_batch_size: 10,
            num_workers: default_num_workers(),
            cache_file: "comparison_cache.json".to_string(),
            debug: false,
        }
    }
}

impl PipelineConfig {
    /// Creates configuration from environment variables, falling back to the
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let config = Self {
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            model: env::var("MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            batch_size: env_usize("BATCH_SIZE", 1000),
            llm_batch_size: env_usize("LLM_BATCH_SIZE", 10),
            num_workers: env_usize("NUM_WORKERS", default_num_workers()),
            cache_file: env::var("CACHE_FILE")
                .unwrap_or_else(|_| "comparison_cache.json".to_string()),
            debug: env::var("DEBUG")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        };

        debug!(
            "Pipeline config: model={}, batch_size={}, llm_batch_size={}, num_workers={}, cache_file={}, debug={}",
            config.model,
            config.batch_size,
            config.llm_batch_size,
            config.num_workers,
            config.cache_file,
            config.debug
        );
        config
    }
}

fn default_num_workers() -> usize {
    num_cpus::get().min(4).max(1)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}
