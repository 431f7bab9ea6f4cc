//! Environment-backed settings.
//!
//! Required: `API_URL`, `DB_URL`. Optional: `API_LANG` (defaults to `en`).
//! A `.env` file in the working directory (or any parent) is loaded first.

use crate::error::{Error, Result};
use std::env;

/// Default language requested from the news API.
pub const DEFAULT_API_LANG: &str = "en";

/// Connection settings resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the news aggregation API.
    pub api_url: String,
    /// Language passed as `?lang=` to the news API.
    pub api_lang: String,
    /// SQLite connection string, e.g. `sqlite://news.db`.
    pub db_url: String,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary lookup function.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get("API_URL").ok_or_else(|| Error::Config("API_URL not set".into()))?;
        let db_url = get("DB_URL").ok_or_else(|| Error::Config("DB_URL not set".into()))?;
        let api_lang = get("API_LANG").unwrap_or_else(|| DEFAULT_API_LANG.to_string());

        Ok(Self {
            api_url,
            api_lang,
            db_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_all_values_present() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("API_URL", "https://fake-api.local"),
            ("DB_URL", "sqlite::memory:"),
            ("API_LANG", "fr"),
        ]))
        .unwrap();

        assert_eq!(settings.api_url, "https://fake-api.local");
        assert_eq!(settings.db_url, "sqlite::memory:");
        assert_eq!(settings.api_lang, "fr");
    }

    #[test]
    fn test_lang_defaults_to_en() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("API_URL", "https://fake-api.local"),
            ("DB_URL", "sqlite::memory:"),
        ]))
        .unwrap();
        assert_eq!(settings.api_lang, "en");
    }

    #[test]
    fn test_missing_api_url_is_config_error() {
        let err = Settings::from_lookup(lookup_from(&[("DB_URL", "sqlite::memory:")])).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("API_URL")));
    }

    #[test]
    fn test_empty_db_url_counts_as_missing() {
        let err = Settings::from_lookup(lookup_from(&[
            ("API_URL", "https://fake-api.local"),
            ("DB_URL", "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("DB_URL")));
    }
}
