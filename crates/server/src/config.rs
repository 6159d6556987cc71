//! Server configuration from the environment.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use newsdesk_core::FeedConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Upstream request timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Cleaned articles shorter than this are answered with 422. 0 disables the check.
    pub min_article_length: usize,
    pub feed_url: String,
    pub feed_limit: usize,
    /// Directory served for every path no API route matches.
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let feed = FeedConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            fetch_timeout_secs: 30,
            min_article_length: 0,
            feed_url: feed.url,
            feed_limit: feed.limit,
            static_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value.parse().context("PORT must be a valid port number")?,
            None => defaults.port,
        };
        let fetch_timeout_secs = match lookup("FETCH_TIMEOUT_SECS") {
            Some(value) => value.parse().context("FETCH_TIMEOUT_SECS must be a number of seconds")?,
            None => defaults.fetch_timeout_secs,
        };
        let min_article_length = match lookup("MIN_ARTICLE_LENGTH") {
            Some(value) => value.parse().context("MIN_ARTICLE_LENGTH must be a non-negative number")?,
            None => defaults.min_article_length,
        };
        let feed_limit = match lookup("FEED_LIMIT") {
            Some(value) => value.parse().context("FEED_LIMIT must be a non-negative number")?,
            None => defaults.feed_limit,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            fetch_timeout_secs,
            min_article_length,
            feed_url: lookup("FEED_URL").unwrap_or(defaults.feed_url),
            feed_limit,
            static_dir: lookup("STATIC_DIR").filter(|dir| !dir.is_empty()).map(PathBuf::from),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn feed(&self) -> FeedConfig {
        FeedConfig { url: self.feed_url.clone(), limit: self.feed_limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.feed(), FeedConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("PORT", "8080"),
            ("FETCH_TIMEOUT_SECS", "10"),
            ("MIN_ARTICLE_LENGTH", "200"),
            ("FEED_LIMIT", "5"),
            ("STATIC_DIR", "public"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.min_article_length, 200);
        assert_eq!(config.feed_limit, 5);
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_vars(vars(&[("PORT", "abc")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
