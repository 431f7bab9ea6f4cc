//! Text summarisation.
//!
//! [`SummarisationModel`] is the entry point the pipeline calls. It owns the
//! contract every backend shares: blank input yields `""` without touching
//! the model, and a trailing `" ."`-style artifact is folded into the
//! punctuation. Backends implement [`SummaryModel`]:
//!
//! - [`LlmSummary`]: asks an LLM for `{"summary_text": "..."}`
//! - [`LeadSummary`]: offline, keeps the leading sentences of the text

use crate::api::AskAsync;
use crate::error::{Error, Result};
use crate::utils::{looks_truncated, truncate_for_log};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Upper bound on summary length, in characters.
pub const SUMMARY_MAX_LENGTH: usize = 150;

/// Lower bound on summary length, in characters.
pub const SUMMARY_MIN_LENGTH: usize = 30;

const TRAILING_PUNCTUATION: [char; 6] = ['.', ',', '!', '?', ';', ':'];

/// A backend that turns non-blank text into a raw summary.
pub trait SummaryModel {
    async fn generate(&self, text: &str, max_length: usize, min_length: usize) -> Result<String>;
}

/// Summariser used by the pipeline, generic over its backend.
#[derive(Debug, Clone)]
pub struct SummarisationModel<M> {
    model: M,
}

impl<M: SummaryModel> SummarisationModel<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Summarise `text` within `min_length..=max_length` characters.
    #[instrument(level = "debug", skip(self, text), fields(bytes = text.len()))]
    pub async fn summarise(
        &self,
        text: &str,
        max_length: usize,
        min_length: usize,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let raw = self.model.generate(text, max_length, min_length).await?;
        Ok(fix_trailing_punctuation(&raw))
    }
}

/// Turn `"Hello ."` into `"Hello."`. Anything else is returned as-is.
pub fn fix_trailing_punctuation(summary: &str) -> String {
    let mut chars = summary.chars().rev();
    match (chars.next(), chars.next()) {
        (Some(last), Some(' ')) if TRAILING_PUNCTUATION.contains(&last) => {
            let cut = summary.len() - last.len_utf8() - 1;
            format!("{}{}", &summary[..cut], last)
        }
        _ => summary.to_string(),
    }
}

/// Reply shape the chat template asks the model for.
#[derive(Debug, Deserialize)]
struct SummaryReply {
    summary_text: String,
}

/// LLM-backed summaries through any [`AskAsync`] client.
#[derive(Debug)]
pub struct LlmSummary<A> {
    api: A,
}

impl<A> LlmSummary<A>
where
    A: AskAsync<Response = String>,
{
    pub fn new(api: A) -> Self {
        Self { api }
    }

    fn prompt(text: &str, max_length: usize, min_length: usize) -> String {
        format!(
            "Summarise the following news story in between {min_length} and {max_length} \
             characters.\n\n{text}"
        )
    }
}

impl<A> SummaryModel for LlmSummary<A>
where
    A: AskAsync<Response = String>,
{
    async fn generate(&self, text: &str, max_length: usize, min_length: usize) -> Result<String> {
        let prompt = Self::prompt(text, max_length, min_length);
        let mut response = self.api.ask(&prompt).await?;
        let mut parsed = serde_json::from_str::<SummaryReply>(&response);

        // A reply cut off mid-JSON usually means the model hit its token limit.
        if let Err(ref e) = parsed {
            if looks_truncated(e) {
                warn!(error = %e, "EOF while parsing; re-asking once");
                response = self.api.ask(&prompt).await?;
                parsed = serde_json::from_str::<SummaryReply>(&response);
            }
        }

        match parsed {
            Ok(reply) => Ok(reply.summary_text),
            Err(e) => {
                warn!(
                    error = %e,
                    response_preview = %truncate_for_log(&response, 300),
                    "Model returned non-conforming JSON"
                );
                Err(Error::UnexpectedModelOutput(e.to_string()))
            }
        }
    }
}

/// Extractive summary: the leading words of the text.
///
/// Keeps words while the result fits in `max_length` characters, then cuts
/// back to the last full sentence if that still leaves `min_length`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadSummary;

impl SummaryModel for LeadSummary {
    async fn generate(&self, text: &str, max_length: usize, min_length: usize) -> Result<String> {
        let mut lead = String::new();
        for word in text.split_whitespace() {
            let extra = if lead.is_empty() { 0 } else { 1 };
            let next_len = lead.chars().count() + extra + word.chars().count();
            if !lead.is_empty() && next_len > max_length {
                break;
            }
            if extra == 1 {
                lead.push(' ');
            }
            lead.push_str(word);
        }

        if let Some(end) = lead.rfind(['.', '!', '?']) {
            let sentence = &lead[..=end];
            if sentence.chars().count() >= min_length {
                lead.truncate(sentence.len());
            }
        }
        debug!(chars = lead.chars().count(), "Built lead summary");
        Ok(lead)
    }
}
