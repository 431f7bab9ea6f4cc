//! Enrichment pipeline: category fetch → extraction → summarisation → storage.
//!
//! Categories are processed one after another and stories one at a time.
//! Nothing is written until every category has been assembled, so any
//! error before the final commit leaves storage untouched.

use crate::client::NewsSource;
use crate::error::{Error, Result};
use crate::models::{NewsRow, SummarisedStory};
use crate::scrapers::{FetchPage, extract_all};
use crate::storage::NewsRepository;
use crate::summariser::{
    SUMMARY_MAX_LENGTH, SUMMARY_MIN_LENGTH, SummarisationModel, SummaryModel,
};
use tracing::{info, instrument};

/// Composition of the pipeline's collaborators.
#[derive(Debug)]
pub struct Pipeline<N, F, M> {
    news: N,
    fetcher: F,
    summariser: SummarisationModel<M>,
    repository: NewsRepository,
}

impl<N, F, M> Pipeline<N, F, M>
where
    N: NewsSource,
    F: FetchPage,
    M: SummaryModel,
{
    pub fn new(
        news: N,
        fetcher: F,
        summariser: SummarisationModel<M>,
        repository: NewsRepository,
    ) -> Self {
        Self {
            news,
            fetcher,
            summariser,
            repository,
        }
    }

    /// Ingest every category and return the number of rows written.
    ///
    /// `per_category_limit` caps how many stubs are taken from each category;
    /// zero or negative is rejected before any network activity.
    #[instrument(level = "info", skip(self))]
    pub async fn run(
        &self,
        categories: &[String],
        per_category_limit: Option<i64>,
    ) -> Result<usize> {
        let limit = validate_limit(per_category_limit)?;
        let mut batch: Vec<NewsRow> = Vec::new();

        for category in categories {
            let stories = self.ingest_category(category, limit).await?;
            batch.extend(stories.into_iter().map(NewsRow::from));
        }

        let written = self.repository.insert_many(&batch).await?;
        info!(written, "Pipeline run complete");
        Ok(written)
    }

    /// Fetch, extract and summarise one category.
    #[instrument(level = "info", skip(self))]
    async fn ingest_category(
        &self,
        category: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SummarisedStory>> {
        let mut stubs = self.news.get_by_category(category, false).await?;
        let listed = stubs.len();
        if let Some(limit) = limit {
            stubs.truncate(limit);
        }

        let extracted = extract_all(&self.fetcher, stubs).await?;
        let mut summarised = Vec::with_capacity(extracted.len());
        for story in extracted {
            let summary = match story.body() {
                Some(body) => Some(
                    self.summariser
                        .summarise(body, SUMMARY_MAX_LENGTH, SUMMARY_MIN_LENGTH)
                        .await?,
                ),
                None => None,
            };
            summarised.push(SummarisedStory::stamp(story, category, summary));
        }

        info!(
            listed,
            extracted = summarised.len(),
            with_summary = summarised.iter().filter(|s| s.summary.is_some()).count(),
            "Category ingested"
        );
        Ok(summarised)
    }
}

fn validate_limit(limit: Option<i64>) -> Result<Option<usize>> {
    match limit {
        None => Ok(None),
        Some(n) if n <= 0 => Err(Error::InvalidArgument(format!(
            "per-category limit must be a positive integer, got {n}"
        ))),
        Some(n) => Ok(Some(usize::try_from(n).unwrap_or(usize::MAX))),
    }
}
