//! Article page fetching and batch extraction.
//!
//! Extraction is sequential: one page fetch at a time, output in input
//! order. Any fetch error aborts the batch, since a partial batch would
//! never reach storage anyway.
//!
//! # Submodules
//!
//! - [`bbc`]: parser for BBC-style article markup

pub mod bbc;

use crate::error::Result;
use crate::models::{ArticleStub, EnrichedStory};
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use tracing::{debug, info, instrument};

/// Retrieves the raw HTML of a publisher page.
pub trait FetchPage {
    /// Fetch `url`, failing on transport errors and non-2xx responses.
    async fn get(&self, url: &str) -> Result<String>;
}

/// [`FetchPage`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

/// Enrich a single stub. Stubs without a link are returned as-is, unfetched.
#[instrument(level = "debug", skip_all, fields(url = %stub.news_link))]
pub async fn extract_story<F: FetchPage>(
    fetcher: &F,
    stub: ArticleStub,
) -> Result<EnrichedStory> {
    if stub.news_link.is_empty() {
        debug!("No news_link; skipping fetch");
        return Ok(EnrichedStory::from(stub));
    }
    let html = fetcher.get(&stub.news_link).await?;
    Ok(bbc::parse(stub, &html))
}

/// Enrich every titled stub, in order. Untitled stubs are dropped unfetched.
#[instrument(level = "info", skip_all, fields(stubs = stubs.len()))]
pub async fn extract_all<F: FetchPage>(
    fetcher: &F,
    stubs: Vec<ArticleStub>,
) -> Result<Vec<EnrichedStory>> {
    let stories: Vec<EnrichedStory> = stream::iter(stubs)
        .filter(|stub| std::future::ready(stub.title().is_some()))
        .then(|stub| extract_story(fetcher, stub))
        .try_collect()
        .await?;

    info!(count = stories.len(), "Extracted stories");
    Ok(stories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_support::{ARTICLE_HTML, serve};
    use axum::{Router, http::StatusCode, routing::get};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned pages and counts calls.
    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }
    }

    impl FetchPage for FakeFetcher {
        async fn get(&self, url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| Error::InvalidArgument(format!("no page for {url}")))
        }
    }

    fn stub(title: Option<&str>, link: &str) -> ArticleStub {
        ArticleStub {
            title: title.map(str::to_string),
            category: None,
            news_link: link.to_string(),
        }
    }

    #[tokio::test]
    async fn test_drops_untitled_and_skips_fetch_for_empty_link() {
        let fetcher = FakeFetcher::default();
        let stubs = vec![stub(None, "https://bbc.local/a"), stub(Some("OK"), "")];
        let out = extract_all(&fetcher, stubs).await.unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].stub.title(), Some("OK"));
        assert_eq!(out[0].full_story, None);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_preserves_input_order() {
        let fetcher = FakeFetcher::default()
            .with_page(
                "https://bbc.local/1",
                r#"<article><div data-component="text-block">One.</div></article>"#,
            )
            .with_page(
                "https://bbc.local/2",
                r#"<article><div data-component="text-block">Two.</div></article>"#,
            );

        let out = extract_all(
            &fetcher,
            vec![
                stub(Some("first"), "https://bbc.local/1"),
                stub(None, "https://bbc.local/ignored"),
                stub(Some("second"), "https://bbc.local/2"),
                stub(Some("third"), ""),
            ],
        )
        .await
        .unwrap();

        let titles: Vec<_> = out.iter().map(|s| s.stub.title().unwrap()).collect();
        assert_eq!(titles, ["first", "second", "third"]);
        assert_eq!(out[0].full_story.as_deref(), Some("One."));
        assert_eq!(out[1].full_story.as_deref(), Some("Two."));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_batch() {
        let fetcher = FakeFetcher::default();
        let stubs = vec![stub(Some("A"), "https://bbc.local/missing")];
        let result = extract_all(&fetcher, stubs).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_http_fetcher_reads_page_and_rejects_non_2xx() {
        let app = Router::new()
            .route("/article", get(|| async { ARTICLE_HTML }))
            .route("/gone", get(|| async { (StatusCode::NOT_FOUND, "gone") }));
        let base = serve(app).await;
        let fetcher = HttpFetcher::new(Client::new());

        let story = extract_story(&fetcher, stub(Some("A"), &format!("{base}/article")))
            .await
            .unwrap();
        assert_eq!(story.byline.as_deref(), Some("Jane Doe"));

        let err = fetcher.get(&format!("{base}/gone")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Http(ref e) if e.status() == Some(reqwest::StatusCode::NOT_FOUND)
        ));
    }
}
