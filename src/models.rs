//! Data models for news stories as they move through the pipeline.
//!
//! - [`ArticleStub`]: minimal descriptor returned by the news API
//! - [`EnrichedStory`]: stub plus the scraped body and byline
//! - [`SummarisedStory`]: enriched story with summary and stamped category
//! - [`NewsRow`]: the persisted row, keyed by title
//!
//! Optional fields are skipped when serializing so an un-enriched story
//! round-trips to the same JSON shape the API returned.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// A story descriptor as published by the aggregation API.
///
/// The API may return items without a title; those are dropped before
/// extraction rather than rejected at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleStub {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Publisher page URL. Empty when the API had no link or sent `null`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub news_link: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ArticleStub {
    /// Title, if present and non-empty.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }
}

/// A stub enriched with content scraped from the publisher page.
///
/// `full_story` and `byline` are both `None` when the page had no
/// `<article>` container; the stub is passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnrichedStory {
    #[serde(flatten)]
    pub stub: ArticleStub,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_story: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_title: Option<String>,
}

impl From<ArticleStub> for EnrichedStory {
    fn from(stub: ArticleStub) -> Self {
        Self {
            stub,
            ..Default::default()
        }
    }
}

impl EnrichedStory {
    /// Body text, if extraction found one and it is not blank.
    pub fn body(&self) -> Option<&str> {
        self.full_story.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// An enriched story with its summary, stamped with the batch category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarisedStory {
    pub story: EnrichedStory,
    /// Category of the batch this story was ingested under.
    pub category: String,
    pub summary: Option<String>,
}

impl SummarisedStory {
    /// Stamp `category` onto `story`, replacing any category it came with.
    pub fn stamp(mut story: EnrichedStory, category: &str, summary: Option<String>) -> Self {
        story.stub.category = Some(category.to_string());
        Self {
            story,
            category: category.to_string(),
            summary,
        }
    }
}

/// A row in the `news` table.
///
/// `title` is the natural key: writing a row whose title already exists
/// replaces the stored values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, sqlx::FromRow)]
pub struct NewsRow {
    pub title: String,
    pub category: String,
    pub summary: String,
    pub full_story: String,
    pub byline: Option<String>,
    pub reporter_title: Option<String>,
}

impl From<SummarisedStory> for NewsRow {
    /// Map a story onto the storage schema.
    ///
    /// `summary` and `full_story` are NOT NULL in storage; a story missing
    /// either is still written, with an empty value and a completeness
    /// warning.
    fn from(s: SummarisedStory) -> Self {
        let title = s.story.stub.title.unwrap_or_default();
        if s.summary.is_none() {
            warn!(%title, category = %s.category, "Story stored without summary");
        }
        if s.story.full_story.is_none() {
            warn!(%title, category = %s.category, "Story stored without full_story");
        }

        Self {
            title,
            category: s.category,
            summary: s.summary.unwrap_or_default(),
            full_story: s.story.full_story.unwrap_or_default(),
            byline: s.story.byline,
            reporter_title: s.story.reporter_title,
        }
    }
}
