/*!
common/src/lib.rs

Shared configuration types for Goodnews.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file
- Layered loading: a defaults file merged with an optional override file
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-headlines query variant: current headlines filtered by country
/// (and optionally by provider category).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopHeadlinesConfig {
    pub country: Option<String>,
    pub category: Option<String>,
}

/// Everything query variant: articles filtered by date range and a named
/// source whitelist, ordered by `sort_by`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EverythingConfig {
    #[serde(default)]
    pub sources: Vec<String>,
    /// Relative window ending today, used when `from`/`to` are not given.
    pub days_back: Option<i64>,
    /// Explicit window bounds, ISO dates (YYYY-MM-DD), passed through verbatim.
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort_by: Option<String>,
}

/// News provider configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Query mode: "top-headlines" (default) or "everything"
    pub mode: Option<String>,
    pub base_url: Option<String>,
    /// Name of the environment variable holding the provider API key
    pub api_key_env: Option<String>,
    pub language: Option<String>,
    pub page_size: Option<u32>,
    pub page: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub top_headlines: Option<TopHeadlinesConfig>,
    pub everything: Option<EverythingConfig>,
}

/// Sentiment model configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the serialized model directory (config.json, vocab.json,
    /// model.safetensors)
    pub path: String,
}

/// Scoring policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Strictly-greater-than cutoff separating "positive" from discarded
    pub threshold: Option<f32>,
}

/// Ingestion endpoint configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub endpoint: String,
    /// Additional attempts after the first on transient failure
    pub max_retries: Option<u32>,
    pub backoff_ms: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

/// Optional interval loop; absent means a single run per invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub interval_minutes: Option<u64>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub news: NewsConfig,
    pub model: ModelConfig,
    pub ingest: IngestConfig,
    pub scorer: Option<ScorerConfig>,
    pub scheduler: Option<SchedulerConfig>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence key-by-key).
    pub async fn load_with_defaults(
        default_path: Option<&Path>,
        override_path: Option<&Path>,
    ) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value =
                    toml::from_str(&data).context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value =
                    toml::from_str(&data).context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [news]
        mode = "top-headlines"
        language = "en"

        [news.top_headlines]
        country = "us"

        [model]
        path = "models/news_sentiment"

        [ingest]
        endpoint = "https://example.org/news"
    "#;

    #[test]
    fn config_from_string() {
        let cfg: Config = toml::from_str(MINIMAL).expect("parse config");
        assert_eq!(cfg.news.mode.as_deref(), Some("top-headlines"));
        assert_eq!(cfg.model.path, "models/news_sentiment");
        assert_eq!(cfg.ingest.endpoint, "https://example.org/news");
        assert!(cfg.scorer.is_none());
        let th = cfg.news.top_headlines.expect("top_headlines section");
        assert_eq!(th.country.as_deref(), Some("us"));
        assert!(th.category.is_none());
    }

    #[tokio::test]
    async fn override_wins_key_by_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default_path = dir.path().join("config.default.toml");
        let override_path = dir.path().join("config.toml");

        std::fs::write(&default_path, MINIMAL).expect("write default");
        std::fs::write(
            &override_path,
            r#"
            [news]
            page_size = 50

            [scorer]
            threshold = 0.7
            "#,
        )
        .expect("write override");

        let cfg = Config::load_with_defaults(Some(&default_path), Some(&override_path))
            .await
            .expect("load merged config");

        // Override adds keys without clobbering sibling tables from defaults
        assert_eq!(cfg.news.page_size, Some(50));
        assert_eq!(cfg.news.language.as_deref(), Some("en"));
        assert_eq!(
            cfg.news.top_headlines.and_then(|t| t.country).as_deref(),
            Some("us")
        );
        assert_eq!(cfg.scorer.and_then(|s| s.threshold), Some(0.7));
    }

    #[tokio::test]
    async fn missing_override_is_tolerated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default_path = dir.path().join("config.default.toml");
        std::fs::write(&default_path, MINIMAL).expect("write default");

        let absent = dir.path().join("config.toml");
        let cfg = Config::load_with_defaults(Some(&default_path), Some(&absent))
            .await
            .expect("load with absent override");
        assert_eq!(cfg.news.language.as_deref(), Some("en"));
    }
}
