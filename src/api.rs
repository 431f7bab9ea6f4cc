//! LLM API interaction with exponential backoff retry logic.
//!
//! - [`AskAsync`]: core trait for sending a prompt and receiving a reply
//! - [`AskFnWrapper`]: adapts `awful_aj::api::ask` to [`AskAsync`]
//! - [`RetryAsk`]: decorator that retries any [`AskAsync`] on failure
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use crate::error::{Error, Result};
use awful_aj::api::ask;
use awful_aj::{config::AwfulJadeConfig, template::ChatTemplate};
use rand::{Rng, rng};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Default number of retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: usize = 5;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Async prompt/response interaction with an LLM.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send `text` to the model and wait for its reply.
    async fn ask(&self, text: &str) -> Result<Self::Response>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
pub struct RetryAsk<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Wrap `inner`, retrying up to `max_retries` times starting at `base_delay`.
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let shift = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(31);
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + Duration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let elapsed_ms_attempt = attempt_t0.elapsed().as_millis();
                    let elapsed_ms_total = total_t0.elapsed().as_millis();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt,
                            elapsed_ms_total,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt,
                        elapsed_ms_total,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Adapts `awful_aj::api::ask` to [`AskAsync`].
///
/// The config carries the endpoint, model and API key; the template carries
/// the system prompt that asks for a `{"summary_text": ...}` reply.
#[derive(Debug, Clone)]
pub struct AskFnWrapper {
    pub config: Arc<AwfulJadeConfig>,
    pub template: Arc<ChatTemplate>,
}

impl AskAsync for AskFnWrapper {
    type Response = String;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response> {
        let t0 = Instant::now();
        let res = ask(&self.config, text.to_string(), &self.template, None, None).await;
        let elapsed_ms = t0.elapsed().as_millis();

        res.map_err(|e| {
            warn!(elapsed_ms, error = %e, "API call failed");
            Error::Model(e.to_string())
        })
    }
}
