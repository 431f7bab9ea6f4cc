//! Command-line interface definitions.
//!
//! Connection settings (`API_URL`, `DB_URL`, `API_LANG`) come from the
//! environment, see [`crate::config`]. The flags here only shape a run.

use crate::cache::DEFAULT_EXPIRE_AFTER;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which response cache backs the news API client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheKind {
    Memory,
    Disk,
    None,
}

/// Which summarisation backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummariserKind {
    /// OpenAI-compatible LLM configured through a config.yaml and chat template
    Llm,
    /// Offline extractive summary built from the leading sentences
    Lead,
}

/// Command-line arguments for a single ingestion run.
///
/// # Examples
///
/// ```sh
/// # Default categories, LLM summaries
/// news_summariser
///
/// # Two stories per category, offline summaries
/// news_summariser -C Business -C Technology --limit 2 --summariser lead
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// News categories to ingest (repeatable)
    #[arg(
        short = 'C',
        long = "category",
        default_values = ["Technology", "Business", "Entertainment"]
    )]
    pub categories: Vec<String>,

    /// Maximum number of stories taken from each category
    #[arg(short, long, allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Response cache for the news API. Ingestion always fetches fresh
    /// listings, so the cache only matters together with --clear-cache
    #[arg(long, value_enum, default_value_t = CacheKind::Memory)]
    pub cache: CacheKind,

    /// Directory for the disk cache
    #[arg(long, default_value = ".cache/news_cache")]
    pub cache_dir: PathBuf,

    /// Seconds before a cached API response is refetched
    #[arg(long, default_value_t = DEFAULT_EXPIRE_AFTER.as_secs())]
    pub cache_expire_secs: u64,

    /// Empty the response cache before the run (e.g. a stale disk cache)
    #[arg(long)]
    pub clear_cache: bool,

    /// Per-request deadline for API and article fetches, in seconds
    #[arg(long, default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Summarisation backend
    #[arg(long, value_enum, default_value_t = SummariserKind::Llm)]
    pub summariser: SummariserKind,

    /// Optional path to the LLM config.yaml file
    #[arg(long)]
    pub config: Option<String>,

    /// Name of the LLM chat template
    #[arg(long, default_value = "news_summariser")]
    pub template: String,
}
