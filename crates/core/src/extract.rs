//! Main content extraction.
//!
//! [`ReadabilityExtractor`] scores candidate containers, propagates scores
//! to their ancestors, keeps the best one together with qualifying siblings
//! and renders the result as plain text.

use crate::metadata::excerpt_from_content;
use crate::parse::{Document, Element};
use crate::scoring::{ScoreConfig, calculate_score, link_density};
use crate::text::{CHROME_ELEMENTS, render_text};
use crate::{NewsdeskError, Result};

/// Tags that are considered potential content containers
const CANDIDATE_TAGS: &[&str] = &["div", "article", "section", "main", "p", "td", "pre", "blockquote"];

/// Containers exempt from the minimum text length.
const CONTAINER_TAGS: &[&str] = &["article", "section", "main"];

/// The title, text and excerpt of the main article on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MainContent {
    /// Headline, or empty when the page has none.
    pub title: String,
    /// Rendered plain text of the main content block, never empty.
    pub text: String,
    /// Short summary, or empty when none is available.
    pub excerpt: String,
}

/// Anything that can find the main content of a parsed page.
///
/// The pipeline is generic over this so callers can plug in a different
/// heuristic, or a fixed result in tests.
pub trait ContentExtractor: Send + Sync {
    /// Locate the main content of `doc`.
    ///
    /// # Errors
    ///
    /// [`NewsdeskError::NoContent`] if nothing usable is found, or
    /// [`NewsdeskError::NotReadable`] if the best block scores too low.
    fn extract(&self, doc: &Document) -> Result<MainContent>;
}

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum score threshold for top candidate
    pub min_score: f64,
    /// Maximum number of top candidates to track
    pub max_top_candidates: usize,
    /// Minimum characters for a non-container candidate
    pub min_candidate_chars: usize,
    /// Sibling score threshold (multiplier of top score)
    pub sibling_threshold: f64,
    /// Scoring weights
    pub score: ScoreConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            max_top_candidates: 5,
            min_candidate_chars: 25,
            sibling_threshold: 0.2,
            score: ScoreConfig::default(),
        }
    }
}

/// A candidate element with its score
#[derive(Debug, Clone)]
struct Candidate<'a> {
    element: Element<'a>,
    score: f64,
}

/// Score-based extractor in the style of Mozilla's Readability.
#[derive(Debug, Clone, Default)]
pub struct ReadabilityExtractor {
    config: ExtractConfig,
}

impl ReadabilityExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Identify all candidate elements from the document, in document order
    fn identify_candidates<'a>(&self, doc: &'a Document) -> Vec<Candidate<'a>> {
        let Ok(elements) = doc.select(&CANDIDATE_TAGS.join(", ")) else {
            return Vec::new();
        };

        elements
            .into_iter()
            .filter(|el| !el.has_ancestor(CHROME_ELEMENTS))
            .filter(|el| {
                CONTAINER_TAGS.contains(&el.tag_name().as_str())
                    || el.text().trim().chars().count() >= self.config.min_candidate_chars
            })
            .map(|element| {
                let score = calculate_score(&element, &self.config.score).final_score;
                Candidate { element, score }
            })
            .collect()
    }

    /// Propagate scores from candidates to their ancestors
    ///
    /// - Parent elements get candidate_score / 2
    /// - Grandparent elements get candidate_score / 3
    ///
    /// Ancestors that were not candidates themselves are added with their
    /// own score plus the propagated share. The `<html>` element never
    /// receives a score.
    fn propagate_scores<'a>(&self, candidates: &mut Vec<Candidate<'a>>) {
        let initial: Vec<(Element<'a>, f64)> = candidates.iter().map(|c| (c.element.clone(), c.score)).collect();

        for (element, score) in initial {
            let parent = element.parent();
            let grandparent = parent.as_ref().and_then(Element::parent);

            for (ancestor, divisor) in [(parent, 2.0), (grandparent, 3.0)] {
                let Some(ancestor) = ancestor else { continue };
                if ancestor.tag_name() == "html" {
                    continue;
                }

                match candidates.iter_mut().find(|c| c.element == ancestor) {
                    Some(existing) => existing.score += score / divisor,
                    None => {
                        let own = calculate_score(&ancestor, &self.config.score).final_score;
                        candidates.push(Candidate { element: ancestor, score: own + score / divisor });
                    }
                }
            }
        }
    }

    /// Select siblings that should be included with the top candidate, in
    /// document order with the top candidate itself at its position.
    ///
    /// Siblings are included if:
    /// - They are among the top candidates with a score >= top_score * sibling_threshold
    /// - Or they are P tags with link_density < 0.25 and more than 80 chars
    fn select_blocks<'a>(&self, top: &Candidate<'a>, candidates: &[Candidate<'a>]) -> Vec<Element<'a>> {
        let Some(parent) = top.element.parent() else {
            return vec![top.element.clone()];
        };

        let threshold = (top.score * self.config.sibling_threshold).max(0.0);

        parent
            .child_elements()
            .into_iter()
            .filter(|sibling| {
                if *sibling == top.element {
                    return true;
                }
                if CHROME_ELEMENTS.contains(&sibling.tag_name().as_str()) {
                    return false;
                }

                let scored = candidates.iter().any(|c| c.element == *sibling && c.score >= threshold);
                if scored {
                    return true;
                }

                sibling.tag_name() == "p"
                    && sibling.text().trim().chars().count() > 80
                    && link_density(sibling) < 0.25
            })
            .collect()
    }
}

impl ContentExtractor for ReadabilityExtractor {
    fn extract(&self, doc: &Document) -> Result<MainContent> {
        let mut candidates = self.identify_candidates(doc);
        self.propagate_scores(&mut candidates);

        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(self.config.max_top_candidates.max(1));

        let top = candidates.first().ok_or(NewsdeskError::NoContent)?;
        if top.score < self.config.min_score {
            return Err(NewsdeskError::NotReadable { score: top.score, threshold: self.config.min_score });
        }

        let blocks = self.select_blocks(top, &candidates);
        let text = render_text(&blocks);
        if text.is_empty() {
            return Err(NewsdeskError::NoContent);
        }

        let title = doc.extract_title().unwrap_or_default();
        let excerpt = doc
            .extract_excerpt()
            .or_else(|| blocks.iter().find_map(excerpt_from_content))
            .unwrap_or_default();

        Ok(MainContent { title, text, excerpt })
    }
}
