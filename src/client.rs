//! Client for the news aggregation API.
//!
//! The API exposes one endpoint, `GET {base_url}/news?lang={lang}`, returning
//! a JSON object that maps category names to lists of story stubs:
//!
//! ```json
//! { "Business": [{ "title": "...", "news_link": "https://..." }], "Technology": [] }
//! ```
//!
//! Responses go through a [`ResponseCache`] unless the caller asks for a
//! fresh round-trip.

use crate::cache::ResponseCache;
use crate::error::Result;
use crate::models::ArticleStub;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Build the HTTP client shared by the API client and the page fetcher.
///
/// `timeout` bounds every request end to end.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Source of story stubs for a category.
pub trait NewsSource {
    /// Stubs listed under `category`. `cache = false` always hits the network.
    async fn get_by_category(&self, category: &str, cache: bool) -> Result<Vec<ArticleStub>>;
}

/// HTTP client for the news API.
#[derive(Debug)]
pub struct NewsApiClient {
    http: Client,
    endpoint: Url,
    cache: ResponseCache,
}

impl NewsApiClient {
    /// Create a client for `api_url`, requesting stories in `lang`.
    pub fn new(http: Client, api_url: &str, lang: &str, cache: ResponseCache) -> Result<Self> {
        let mut endpoint = Url::parse(&format!("{}/news", api_url.trim_end_matches('/')))?;
        endpoint.query_pairs_mut().append_pair("lang", lang);
        Ok(Self {
            http,
            endpoint,
            cache,
        })
    }

    /// The full request URL, also used as the cache key.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch the whole category map.
    #[instrument(level = "info", skip(self), fields(endpoint = %self.endpoint))]
    pub async fn fetch_all(&self, cache: bool) -> Result<Map<String, Value>> {
        let key = self.endpoint.as_str();
        if cache {
            if let Some(body) = self.cache.get(key).await? {
                debug!("Serving news from cache");
                return Ok(serde_json::from_str(&body)?);
            }
        }

        let response = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        let news: Map<String, Value> = serde_json::from_str(&body)?;
        info!(categories = news.len(), bytes = body.len(), "Fetched news index");

        if cache {
            self.cache.put(key, &body).await?;
        }
        Ok(news)
    }

    /// Drop every cached response.
    pub async fn clear_cache(&self) -> Result<()> {
        self.cache.clear().await
    }
}

impl NewsSource for NewsApiClient {
    #[instrument(level = "info", skip(self))]
    async fn get_by_category(&self, category: &str, cache: bool) -> Result<Vec<ArticleStub>> {
        let mut news = self.fetch_all(cache).await?;
        let stubs = match news.remove(category) {
            Some(value) => serde_json::from_value::<Vec<ArticleStub>>(value)?,
            None => Vec::new(),
        };
        info!(count = stubs.len(), "Stubs for category");
        Ok(stubs)
    }
}
