//! Content fetching from URLs, files, and stdin.
//!
//! This module provides functions for retrieving HTML content from
//! various sources: HTTP/HTTPS URLs, local files, and standard input.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use url::Url;

use crate::{NewsdeskError, Result};

/// HTTP client configuration for fetching web pages.
///
/// Defaults mimic a desktop browser with a German language preference,
/// which the supported news sites expect.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent string.
    pub user_agent: String,
    /// Accept header for article requests.
    pub accept: String,
    /// Accept-Language header.
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".to_string(),
            accept: "text/html,application/xhtml+xml".to_string(),
            accept_language: "de-DE,de;q=0.9".to_string(),
        }
    }
}

/// Builds the shared HTTP client for `config`.
///
/// The client follows redirects and enforces the configured timeout on every
/// request.
pub fn build_client(config: &FetchConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(NewsdeskError::HttpError)
}

/// Fetches HTML content from a URL.
///
/// Only `http` and `https` URLs are accepted. A non-2xx answer is returned as
/// [`NewsdeskError::HttpStatus`] carrying the upstream status code.
pub async fn fetch_url(client: &Client, url: &str, config: &FetchConfig) -> Result<String> {
    fetch_text(client, url, &config.accept, config).await
}

/// Fetches a URL as text with an explicit `Accept` header.
pub(crate) async fn fetch_text(client: &Client, url: &str, accept: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = parse_http_url(url)?;
    let timeout = config.timeout;
    let map_err = |e: reqwest::Error| {
        if e.is_timeout() { NewsdeskError::Timeout { timeout } } else { NewsdeskError::HttpError(e) }
    };

    let response = client
        .get(parsed_url)
        .header(USER_AGENT, &config.user_agent)
        .header(ACCEPT, accept)
        .header(ACCEPT_LANGUAGE, &config.accept_language)
        .send()
        .await
        .map_err(map_err)?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(url, status = status.as_u16(), "upstream returned an error status");
        return Err(NewsdeskError::HttpStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    response.text().await.map_err(map_err)
}

/// Parses `url` and checks it is fetchable over HTTP.
pub fn parse_http_url(url: &str) -> Result<Url> {
    let parsed_url = Url::parse(url).map_err(|e| NewsdeskError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed_url.scheme() {
        "http" | "https" => Ok(parsed_url),
        scheme => Err(NewsdeskError::InvalidUrl(format!("unsupported scheme `{scheme}` in {url}"))),
    }
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(NewsdeskError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(NewsdeskError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(NewsdeskError::from)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.accept_language, "de-DE,de;q=0.9");
    }

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://www.bild.de/news").is_ok());
        assert!(matches!(parse_http_url("not-a-url"), Err(NewsdeskError::InvalidUrl(_))));
        assert!(matches!(parse_http_url("ftp://example.com/a"), Err(NewsdeskError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_url_sends_browser_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/artikel")
                    .header("accept-language", "de-DE,de;q=0.9")
                    .header("accept", "text/html,application/xhtml+xml");
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body("<html><body>Hallo</body></html>");
            })
            .await;

        let config = FetchConfig::default();
        let client = build_client(&config).unwrap();
        let body = fetch_url(&client, &server.url("/artikel"), &config).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, "<html><body>Hallo</body></html>");
    }

    #[tokio::test]
    async fn test_fetch_url_reports_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/fehlt");
                then.status(404).body("not found");
            })
            .await;

        let config = FetchConfig::default();
        let client = build_client(&config).unwrap();
        let result = fetch_url(&client, &server.url("/fehlt"), &config).await;

        match result {
            Err(NewsdeskError::HttpStatus { status, reason }) => {
                assert_eq!(status, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_url_invalid() {
        let config = FetchConfig::default();
        let client = build_client(&config).unwrap();
        let result = fetch_url(&client, "not-a-url", &config).await;

        assert!(matches!(result, Err(NewsdeskError::InvalidUrl(_))));
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(NewsdeskError::FileNotFound(_))));
    }

    #[test]
    fn test_error_timeout_message() {
        let err = NewsdeskError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }
}
