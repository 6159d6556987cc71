//! Article pipeline: fetch, prune, extract, clean, validate.
//!
//! # Example
//!
//! ```rust
//! use newsdesk_core::{Pipeline, PipelineConfig, PipelineOutcome};
//!
//! let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
//! let html = r#"<html><body>
//!     <nav>Startseite</nav>
//!     <article><p>Berlin (dpa) – Die Koalition hat sich auf einen Haushalt geeinigt.</p></article>
//! </body></html>"#;
//!
//! match pipeline.process_html(html, None) {
//!     PipelineOutcome::Success(article) => assert!(article.text.starts_with("Berlin (dpa)")),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use serde_json::{Value, json};
use url::Url;

use crate::clean::TextCleaner;
use crate::extract::{ContentExtractor, ReadabilityExtractor};
use crate::fetch::{FetchConfig, build_client, fetch_url, parse_http_url};
use crate::parse::Document;
use crate::prune::prune_html;
use crate::rules::RuleSet;
use crate::{NewsdeskError, Result};

const FETCH_FAILED: &str = "Artikel konnte nicht geladen werden";
const LOAD_ERROR: &str = "Fehler beim Laden";
const NOT_EXTRACTED: &str = "Artikeltext konnte nicht extrahiert werden";

/// Markup of one page together with the address it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub html: String,
    pub url: Option<Url>,
}

/// A successfully processed article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedArticle {
    pub title: String,
    /// Cleaned text: trimmed, with at most one blank line between paragraphs.
    pub text: String,
    pub excerpt: String,
    /// Length of `text` in characters.
    pub length: usize,
}

/// Result of one pipeline invocation.
///
/// No partial results: either the whole article or a typed failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Success(ExtractedArticle),
    /// The page could not be loaded. `status` is the upstream status for
    /// non-2xx answers and a gateway-style status otherwise.
    FetchFailure { status: u16, message: String },
    /// The page loaded but yielded no usable article text.
    ExtractionFailure { message: String },
}

impl PipelineOutcome {
    /// Map a pipeline error onto the outcome a caller sees.
    pub fn from_error(err: &NewsdeskError) -> Self {
        match err {
            NewsdeskError::HttpStatus { status, reason } => {
                PipelineOutcome::FetchFailure { status: *status, message: format!("{FETCH_FAILED}: {reason}") }
            }
            NewsdeskError::Timeout { .. } => PipelineOutcome::FetchFailure { status: 504, message: format!("{LOAD_ERROR}: {err}") },
            NewsdeskError::HttpError(_) => PipelineOutcome::FetchFailure { status: 502, message: format!("{LOAD_ERROR}: {err}") },
            NewsdeskError::InvalidUrl(_) => PipelineOutcome::FetchFailure { status: 400, message: format!("{LOAD_ERROR}: {err}") },
            NewsdeskError::TooShort { length, minimum } => PipelineOutcome::ExtractionFailure {
                message: format!("{NOT_EXTRACTED}: nur {length} Zeichen, mindestens {minimum} erforderlich"),
            },
            _ => PipelineOutcome::ExtractionFailure { message: NOT_EXTRACTED.to_string() },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success(_))
    }

    /// HTTP status a caller should answer with: 200, the mirrored fetch
    /// status, or 422.
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineOutcome::Success(_) => 200,
            PipelineOutcome::FetchFailure { status, .. } => *status,
            PipelineOutcome::ExtractionFailure { .. } => 422,
        }
    }

    /// JSON body: the article on success, `{ "error": message }` otherwise.
    pub fn to_json(&self) -> Value {
        match self {
            PipelineOutcome::Success(article) => json!({
                "title": article.title,
                "text": article.text,
                "excerpt": article.excerpt,
                "length": article.length,
            }),
            PipelineOutcome::FetchFailure { message, .. } | PipelineOutcome::ExtractionFailure { message } => {
                json!({ "error": message })
            }
        }
    }
}

impl From<Result<ExtractedArticle>> for PipelineOutcome {
    fn from(result: Result<ExtractedArticle>) -> Self {
        match result {
            Ok(article) => PipelineOutcome::Success(article),
            Err(err) => PipelineOutcome::from_error(&err),
        }
    }
}

/// Configuration for a [`Pipeline`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Cleaned text shorter than this many characters is rejected. 0 disables the check.
    pub min_length: usize,
    pub fetch: FetchConfig,
}

/// Turns article URLs or raw markup into [`PipelineOutcome`]s.
///
/// Holds one HTTP client and one immutable rule set; both are shared by
/// every invocation, so a pipeline can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct Pipeline<E = ReadabilityExtractor> {
    rules: Arc<RuleSet>,
    extractor: E,
    client: Client,
    config: PipelineConfig,
}

impl Pipeline<ReadabilityExtractor> {
    /// A pipeline with the standard rule set and the readability extractor.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_extractor(config, Arc::new(RuleSet::standard()), ReadabilityExtractor::default())
    }
}

impl<E: ContentExtractor> Pipeline<E> {
    pub fn with_extractor(config: PipelineConfig, rules: Arc<RuleSet>, extractor: E) -> Result<Self> {
        let client = build_client(&config.fetch)?;
        Ok(Self { rules, extractor, client, config })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetch `url` and run it through every stage.
    pub async fn extract_article(&self, url: &str) -> PipelineOutcome {
        let outcome = match self.fetch_document(url).await {
            Ok(raw) => self.process(&raw),
            Err(err) => {
                tracing::warn!(url, error = %err, "article fetch failed");
                PipelineOutcome::from_error(&err)
            }
        };

        match &outcome {
            PipelineOutcome::Success(article) => tracing::info!(url, length = article.length, "article extracted"),
            PipelineOutcome::ExtractionFailure { message } => tracing::info!(url, reason = %message, "no article text"),
            PipelineOutcome::FetchFailure { .. } => {}
        }
        outcome
    }

    /// Download `url` into a [`RawDocument`].
    pub async fn fetch_document(&self, url: &str) -> Result<RawDocument> {
        let parsed = parse_http_url(url)?;
        let html = fetch_url(&self.client, url, &self.config.fetch).await?;
        Ok(RawDocument { html, url: Some(parsed) })
    }

    /// Run already-loaded markup through prune, extract, clean and validate.
    pub fn process(&self, raw: &RawDocument) -> PipelineOutcome {
        self.run(&raw.html, raw.url.as_ref()).into()
    }

    /// Like [`Pipeline::process`] for markup that is not wrapped in a
    /// [`RawDocument`].
    pub fn process_html(&self, html: &str, url: Option<&Url>) -> PipelineOutcome {
        self.run(html, url).into()
    }

    fn run(&self, html: &str, url: Option<&Url>) -> Result<ExtractedArticle> {
        let pruned = prune_html(html, self.rules.selectors());
        tracing::debug!(removed = pruned.removed, skipped = pruned.skipped.len(), "pruned page chrome");

        let doc = Document::parse_with_base_url(&pruned.html, url.cloned())?;
        let content = self.extractor.extract(&doc)?;
        if content.text.trim().is_empty() {
            return Err(NewsdeskError::NoContent);
        }

        let text = TextCleaner::new(&self.rules).clean(&content.text);
        let length = text.chars().count();
        if length == 0 {
            return Err(NewsdeskError::NoContent);
        }
        if length < self.config.min_length {
            return Err(NewsdeskError::TooShort { length, minimum: self.config.min_length });
        }

        Ok(ExtractedArticle { title: content.title, text, excerpt: content.excerpt, length })
    }
}
