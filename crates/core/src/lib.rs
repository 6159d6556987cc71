pub mod clean;
pub mod error;
pub mod extract;
#[cfg(feature = "feed")]
pub mod feed;
pub mod fetch;
pub mod metadata;
pub mod parse;
pub mod pipeline;
pub mod prune;
pub mod rules;
pub mod scoring;
pub mod text;

pub use clean::{TextCleaner, collapse_blank_lines};
pub use error::{NewsdeskError, Result, RuleApplicationError};
pub use extract::{ContentExtractor, ExtractConfig, MainContent, ReadabilityExtractor};
#[cfg(feature = "feed")]
pub use feed::{FeedConfig, FeedEntry, fetch_feed, parse_news_sitemap};
pub use fetch::{FetchConfig, build_client, fetch_file, fetch_stdin, fetch_url};
pub use parse::Document;
pub use pipeline::{ExtractedArticle, Pipeline, PipelineConfig, PipelineOutcome, RawDocument};
pub use prune::{PruneReport, prune_html};
pub use rules::{RuleSet, SanitizerRule, TextStripRule};
#[doc(hidden)]
pub use scoring::{ScoreConfig, ScoreResult, calculate_score, link_density};
