//! # News Summariser
//!
//! A batch pipeline that pulls story stubs from a news aggregation API,
//! scrapes each story's full body and byline from the publisher page,
//! summarises the body and upserts the result into SQLite keyed by title.
//!
//! ## Usage
//!
//! ```sh
//! API_URL=http://localhost:8000 DB_URL=sqlite://news.db news_summariser -C Business --limit 5
//! ```
//!
//! ## Architecture
//!
//! 1. **Listing**: fetch the stubs for each category from the news API
//! 2. **Extraction**: download each story page and parse byline and body
//! 3. **Summarisation**: summarise every body through the selected backend
//! 4. **Storage**: upsert the whole batch in one transaction
//!
//! Any fetch or model error aborts the run before anything is written.

use clap::Parser;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cache;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod normalize;
mod pipeline;
mod scrapers;
mod storage;
mod summariser;
#[cfg(test)]
mod test_support;
mod utils;

use api::{AskFnWrapper, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, RetryAsk};
use cache::{DiskCache, MemoryCache, ResponseCache};
use cli::{CacheKind, Cli, SummariserKind};
use client::{NewsApiClient, build_http_client};
use config::Settings;
use error::{Error, Result};
use pipeline::Pipeline;
use scrapers::HttpFetcher;
use storage::NewsRepository;
use summariser::{LeadSummary, LlmSummary, SummarisationModel, SummaryModel};

#[tokio::main]
#[instrument]
async fn main() -> std::result::Result<(), Box<dyn StdError>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("news_summariser starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let written = match run(&args).await {
        Ok(written) => written,
        Err(e) => {
            error!(error = %e, "Run aborted; nothing was written");
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        written,
        "Execution complete"
    );
    Ok(())
}

/// Build the collaborators from settings and flags, then run the pipeline once.
async fn run(args: &Cli) -> Result<usize> {
    let settings = Settings::from_env()?;
    info!(api_url = %settings.api_url, api_lang = %settings.api_lang, "Loaded settings");

    let http = build_http_client(Duration::from_secs(args.fetch_timeout_secs))?;
    let news = NewsApiClient::new(
        http.clone(),
        &settings.api_url,
        &settings.api_lang,
        response_cache(args),
    )?;
    info!(endpoint = %news.endpoint(), "News API client ready");
    if args.clear_cache {
        news.clear_cache().await?;
        info!("Cleared response cache");
    }
    let fetcher = HttpFetcher::new(http);
    let repository = NewsRepository::connect(&settings.db_url).await?;

    let written = match args.summariser {
        SummariserKind::Llm => {
            let model = llm_summary(args).await?;
            ingest(args, news, fetcher, model, repository.clone()).await?
        }
        SummariserKind::Lead => {
            ingest(args, news, fetcher, LeadSummary, repository.clone()).await?
        }
    };
    info!(stored = repository.count().await?, "Rows in news table");
    Ok(written)
}

async fn ingest<M: SummaryModel>(
    args: &Cli,
    news: NewsApiClient,
    fetcher: HttpFetcher,
    model: M,
    repository: NewsRepository,
) -> Result<usize> {
    let pipeline = Pipeline::new(news, fetcher, SummarisationModel::new(model), repository);
    pipeline.run(&args.categories, args.limit).await
}

fn response_cache(args: &Cli) -> ResponseCache {
    let expire_after = Duration::from_secs(args.cache_expire_secs);
    match args.cache {
        CacheKind::Memory => ResponseCache::Memory(MemoryCache::new(expire_after)),
        CacheKind::Disk => ResponseCache::Disk(DiskCache::new(&args.cache_dir, expire_after)),
        CacheKind::None => ResponseCache::Disabled,
    }
}

/// Load the chat template and LLM config, wrapped in retry with backoff.
async fn llm_summary(args: &Cli) -> Result<LlmSummary<RetryAsk<AskFnWrapper>>> {
    let template = awful_aj::template::load_template(&args.template)
        .await
        .map_err(|e| Error::Config(format!("failed to load template {}: {e}", args.template)))?;
    info!(template = %args.template, "Loaded template");

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => awful_aj::config_dir()
            .map_err(|e| Error::Config(format!("no LLM config directory: {e}")))?
            .join("config.yaml")
            .to_string_lossy()
            .into_owned(),
    };
    let config = awful_aj::config::load_config(&config_path)
        .map_err(|e| Error::Config(format!("failed to load {config_path}: {e}")))?;
    info!(config_path, "Loaded configuration");

    let ask = AskFnWrapper {
        config: Arc::new(config),
        template: Arc::new(template),
    };
    Ok(LlmSummary::new(RetryAsk::new(
        ask,
        DEFAULT_MAX_RETRIES,
        DEFAULT_BASE_DELAY,
    )))
}
