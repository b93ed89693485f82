/*
goodnews - single-binary main.rs
This binary runs the fetch -> score -> publish pipeline once, or on an
interval when the scheduler section is configured.
*/

use anyhow::{Context, Result};
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use tokio::select;
use tokio::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use goodnews::fetch::{FetchMode, NewsClient, QueryDefaults};
use goodnews::pipeline;
use goodnews::publish::Publisher;
use goodnews::sentiment::TitleClassifier;

#[derive(Parser, Debug)]
#[command(name = "goodnews", about = "Goodnews update worker: fetch, score, publish")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run a single update even if a scheduler interval is configured
    #[arg(long)]
    once: bool,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    };

    // Load configuration with defaults
    let config = match Config::load_with_defaults(
        if default_path.exists() {
            Some(&default_path)
        } else {
            None
        },
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%e, "failed to load configuration");
            return Err(e);
        }
    };
    info!(default = ?default_path, override_file = ?override_path, "configuration loaded");

    // Load the sentiment model; a missing or corrupt artifact is fatal.
    let model = TitleClassifier::load(&config.model.path)
        .with_context(|| format!("failed to load sentiment model from {}", config.model.path))?;
    info!(path = %config.model.path, "sentiment model loaded");

    // The provider API key comes from the environment, never from config literals.
    let api_key_env = config.news.api_key_env.as_deref().unwrap_or("NEWS_API_KEY");
    let api_key = std::env::var(api_key_env)
        .with_context(|| format!("news API key env var '{}' not set", api_key_env))?;

    let news = NewsClient::new(
        config
            .news
            .base_url
            .as_deref()
            .unwrap_or("https://newsapi.org/v2"),
        api_key,
        config.news.timeout_seconds.unwrap_or(10),
    )?;
    let defaults = QueryDefaults {
        language: config
            .news
            .language
            .clone()
            .unwrap_or_else(|| "en".to_string()),
        page_size: config.news.page_size.unwrap_or(100),
        page: config.news.page.unwrap_or(1),
    };
    let mode = FetchMode::from_config(&config.news)?;
    info!(?mode, "fetch mode resolved");

    let publisher = Publisher::new(
        &config.ingest.endpoint,
        config.ingest.max_retries.unwrap_or(2),
        config.ingest.backoff_ms.unwrap_or(100),
        config.ingest.timeout_seconds.unwrap_or(10),
    )?;
    let threshold = config
        .scorer
        .as_ref()
        .and_then(|s| s.threshold)
        .unwrap_or(0.5);

    let interval = config
        .scheduler
        .as_ref()
        .and_then(|s| s.interval_minutes)
        .filter(|m| *m > 0);

    match interval {
        Some(minutes) if !args.once => {
            info!("worker: starting interval loop every {} minutes", minutes);
            loop {
                pipeline::run(&news, &mode, &defaults, &model, &publisher, threshold).await?;
                select! {
                    _ = tokio::time::sleep(Duration::from_secs(minutes * 60)) => {}
                    _ = tokio::signal::ctrl_c() => {
                        info!("ctrl-c received, exiting loop");
                        break;
                    }
                }
            }
        }
        _ => {
            pipeline::run(&news, &mode, &defaults, &model, &publisher, threshold).await?;
        }
    }

    info!("shutdown complete");
    Ok(())
}
