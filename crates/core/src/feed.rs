//! Current article URLs from a Google News sitemap.
//!
//! Sitemaps put their elements in the sitemap and news namespaces, so the
//! queries match on `local-name()` and work with any prefix.

use reqwest::Client;
use serde::Serialize;
use sxd_document::parser;
use sxd_xpath::{Context, Factory, Value, XPath};

use crate::fetch::{FetchConfig, fetch_text};
use crate::{NewsdeskError, Result};

/// Accept header for sitemap requests.
pub const SITEMAP_ACCEPT: &str = "application/xml,text/xml";

const URL_XPATH: &str = "//*[local-name()='url']";
const LOC_XPATH: &str = "*[local-name()='loc']";
const TITLE_XPATH: &str = "*[local-name()='news']/*[local-name()='title']";
const DATE_XPATH: &str = "*[local-name()='news']/*[local-name()='publication_date']";

/// Titles shorter than this are teaser fragments, not headlines.
const MIN_TITLE_CHARS: usize = 10;
const MAX_TITLE_CHARS: usize = 150;

/// Where to read the feed from and how many entries to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub url: String,
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { url: "https://www.bild.de/sitemap-news.xml".to_string(), limit: 15 }
    }
}

/// One article announced by the sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub url: String,
    pub title: String,
    /// Publication date as written in the sitemap, or empty.
    pub date: String,
}

/// Compiled queries for one parse run.
struct SitemapQueries {
    urls: XPath,
    loc: XPath,
    title: XPath,
    date: XPath,
}

impl SitemapQueries {
    fn new() -> Result<Self> {
        let factory = Factory::new();
        let build = |xpath: &str| -> Result<XPath> {
            factory
                .build(xpath)
                .map_err(|e| NewsdeskError::Sitemap(format!("Invalid XPath '{}': {}", xpath, e)))?
                .ok_or_else(|| NewsdeskError::Sitemap(format!("Invalid XPath: {}", xpath)))
        };

        Ok(Self { urls: build(URL_XPATH)?, loc: build(LOC_XPATH)?, title: build(TITLE_XPATH)?, date: build(DATE_XPATH)? })
    }
}

/// Parse a news sitemap into at most `config.limit` entries, in sitemap order.
///
/// Entries without a location or title are skipped, as are titles shorter
/// than ten characters, repeated URLs and live tickers. Titles longer than
/// 150 characters are shortened to 147 plus `...`.
///
/// # Errors
///
/// Returns [`NewsdeskError::Sitemap`] if `xml` is not well-formed.
pub fn parse_news_sitemap(xml: &str, config: &FeedConfig) -> Result<Vec<FeedEntry>> {
    let queries = SitemapQueries::new()?;
    let package = parser::parse(xml).map_err(|e| NewsdeskError::Sitemap(format!("Failed to parse sitemap: {}", e)))?;
    let document = package.as_document();
    let context = Context::new();

    let Value::Nodeset(urls) = queries.urls.evaluate(&context, document.root())? else {
        return Ok(Vec::new());
    };

    let mut entries: Vec<FeedEntry> = Vec::new();
    for node in urls.document_order() {
        if entries.len() >= config.limit {
            break;
        }

        let url = queries.loc.evaluate(&context, node)?.string().trim().to_string();
        let title = queries.title.evaluate(&context, node)?.string().trim().to_string();
        if url.is_empty() || title.chars().count() < MIN_TITLE_CHARS {
            continue;
        }
        if entries.iter().any(|e| e.url == url) {
            continue;
        }
        if title.to_lowercase().contains("live-ticker") {
            continue;
        }

        let date = queries.date.evaluate(&context, node)?.string().trim().to_string();
        entries.push(FeedEntry { url, title: shorten_title(title), date });
    }

    tracing::debug!(count = entries.len(), "parsed news sitemap");
    Ok(entries)
}

/// Fetch and parse the sitemap at `config.url`.
pub async fn fetch_feed(client: &Client, config: &FeedConfig, fetch: &FetchConfig) -> Result<Vec<FeedEntry>> {
    let xml = fetch_text(client, &config.url, SITEMAP_ACCEPT, fetch).await?;
    parse_news_sitemap(&xml, config)
}

fn shorten_title(title: String) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let head: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{head}...")
    } else {
        title
    }
}
