//! Client configuration.
//!
//! Values come from `Default`, from a serialized document, or from the
//! environment (`INQUIRE_*` variables), in that order of convenience.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::request::{Limits, RequestBuilder};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_MAX_QUESTION_LENGTH: usize = 140;
pub const DEFAULT_MAX_ANSWER_LENGTH: usize = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub max_question_length: usize,
    pub max_answer_length: usize,
    #[serde(rename = "timeout_secs", with = "secs")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_question_length: DEFAULT_MAX_QUESTION_LENGTH,
            max_answer_length: DEFAULT_MAX_ANSWER_LENGTH,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Read `INQUIRE_BASE_URL`, `INQUIRE_MAX_QUESTION_LENGTH`,
    /// `INQUIRE_MAX_ANSWER_LENGTH` and `INQUIRE_TIMEOUT_SECS`, keeping the
    /// default for any variable that is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("INQUIRE_BASE_URL") {
            let is_http = Url::parse(&value)
                .map(|url| matches!(url.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !is_http {
                return Err(ConfigError::InvalidUrl {
                    key: "INQUIRE_BASE_URL",
                    value,
                });
            }
            config.base_url = value;
        }
        if let Some(value) = lookup("INQUIRE_MAX_QUESTION_LENGTH") {
            config.max_question_length = parse_positive("INQUIRE_MAX_QUESTION_LENGTH", value)?;
        }
        if let Some(value) = lookup("INQUIRE_MAX_ANSWER_LENGTH") {
            config.max_answer_length = parse_positive("INQUIRE_MAX_ANSWER_LENGTH", value)?;
        }
        if let Some(value) = lookup("INQUIRE_TIMEOUT_SECS") {
            let secs = parse_positive("INQUIRE_TIMEOUT_SECS", value)?;
            config.request_timeout = Duration::from_secs(secs as u64);
        }

        Ok(config)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_question_length: self.max_question_length,
            max_answer_length: self.max_answer_length,
        }
    }

    pub fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::new(&self.base_url, self.limits())
    }
}

fn parse_positive(key: &'static str, value: String) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { key, value }),
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("INQUIRE_BASE_URL", "https://inquire.example.com/api"),
            ("INQUIRE_MAX_QUESTION_LENGTH", "200"),
            ("INQUIRE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://inquire.example.com/api");
        assert_eq!(config.max_question_length, 200);
        assert_eq!(config.max_answer_length, DEFAULT_MAX_ANSWER_LENGTH);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_zero_limit() {
        let err = ClientConfig::from_lookup(lookup(&[("INQUIRE_MAX_ANSWER_LENGTH", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                key: "INQUIRE_MAX_ANSWER_LENGTH",
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = ClientConfig::from_lookup(lookup(&[("INQUIRE_BASE_URL", "ftp://x")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn deserializes_partial_document() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"max_answer_length": 1000, "timeout_secs": 10}"#).unwrap();
        assert_eq!(config.max_answer_length, 1000);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
