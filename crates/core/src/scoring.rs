//! Candidate scoring for the readability extractor.
//!
//! A score is `(tag weight + class weight + density) * link penalty`.
//! Text statistics are gathered once per element and shared by every term.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::Element;

/// Weights and caps of the scoring formula.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Added when a class or id looks like article content.
    pub positive_weight: f64,
    /// Added when a class or id looks like page chrome.
    pub negative_weight: f64,
    /// Cap on the points earned by text length.
    pub max_char_density_score: f64,
    /// Cap on the points earned by commas.
    pub max_comma_density_score: f64,
    /// Characters of text per length point.
    pub chars_per_point: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_char_density_score: 3.0,
            max_comma_density_score: 3.0,
            chars_per_point: 100,
        }
    }
}

/// The terms that made up one element's score.
#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub base_score: f64,
    pub class_weight: f64,
    pub content_density: f64,
    /// Share of the text inside links, 0.0 to 1.0.
    pub link_density: f64,
    pub final_score: f64,
}

/// Elements with more text than this get the reduced link penalty.
const CONTENT_RICH_CHARS: usize = 500;

static POSITIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|artikel|body|content|entry|main|page|post|text|story)")
        .expect("positive class pattern should compile")
});

static NEGATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|comment|community|disqus|extra|foot|header|menu|related|remark|rss|sidebar|sponsor|ad-break|pagination|pager|popup|teaser|share|paywall|newsletter|kommentar|empfehlung)",
    )
    .expect("negative class pattern should compile")
});

/// Character counts of an element's text.
struct TextStats {
    chars: usize,
    commas: usize,
    link_chars: usize,
}

impl TextStats {
    fn of(element: &Element<'_>) -> Self {
        let text = element.text();
        let link_chars = element
            .select("a")
            .unwrap_or_default()
            .iter()
            .map(|link| link.text().chars().count())
            .sum();

        Self { chars: text.chars().count(), commas: text.matches(',').count(), link_chars }
    }

    fn link_density(&self) -> f64 {
        if self.chars == 0 { 0.0 } else { (self.link_chars as f64 / self.chars as f64).min(1.0) }
    }

    fn density_score(&self, config: &ScoreConfig) -> f64 {
        let length_points = ((self.chars / config.chars_per_point.max(1)) as f64).min(config.max_char_density_score);
        let comma_points = (self.commas as f64).min(config.max_comma_density_score);
        length_points + comma_points
    }
}

/// Weight of a tag on its own: containers score up, headings and chrome score down.
pub fn tag_weight(tag: &str) -> f64 {
    match tag {
        "article" => 10.0,
        "section" | "main" => 8.0,
        "div" => 5.0,
        "td" | "blockquote" => 3.0,
        "form" | "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" => -5.0,
        _ => 0.0,
    }
}

/// Weight from the element's id and class tokens.
///
/// The id is looked at first, then each class token in order; the first token
/// matching either pattern decides, with the positive pattern winning on a tie.
pub fn class_id_weight(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let id = element.attr("id");
    let classes = element.attr("class").unwrap_or_default();

    id.into_iter()
        .chain(classes.split_whitespace())
        .find_map(|token| {
            if POSITIVE_RE.is_match(token) {
                Some(config.positive_weight)
            } else if NEGATIVE_RE.is_match(token) {
                Some(config.negative_weight)
            } else {
                None
            }
        })
        .unwrap_or(0.0)
}

/// Points for text length and comma count.
pub fn content_density_score(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    TextStats::of(element).density_score(config)
}

/// Share of an element's text that sits inside links, capped at 1.0.
pub fn link_density(element: &Element<'_>) -> f64 {
    TextStats::of(element).link_density()
}

/// Score `element`.
///
/// The link penalty is `1 - link density`, halved for elements with a
/// positive class weight or more than 500 characters of text.
pub fn calculate_score(element: &Element<'_>, config: &ScoreConfig) -> ScoreResult {
    let stats = TextStats::of(element);
    let base_score = tag_weight(&element.tag_name());
    let class_weight = class_id_weight(element, config);
    let content_density = stats.density_score(config);
    let link_density = stats.link_density();

    let penalty = if class_weight > 0.0 || stats.chars > CONTENT_RICH_CHARS { link_density * 0.5 } else { link_density };
    let final_score = (base_score + class_weight + content_density) * (1.0 - penalty);

    ScoreResult { base_score, class_weight, content_density, link_density, final_score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;
    use rstest::rstest;

    fn score_of(html: &str, selector: &str) -> ScoreResult {
        let doc = Document::parse(html).unwrap();
        let element = doc.select(selector).unwrap().into_iter().next().unwrap();
        calculate_score(&element, &ScoreConfig::default())
    }

    #[rstest]
    #[case("article", 10.0)]
    #[case("main", 8.0)]
    #[case("section", 8.0)]
    #[case("div", 5.0)]
    #[case("blockquote", 3.0)]
    #[case("p", 0.0)]
    #[case("span", 0.0)]
    #[case("li", -3.0)]
    #[case("form", -3.0)]
    #[case("h2", -5.0)]
    #[case("nav", -5.0)]
    #[case("footer", -5.0)]
    fn test_tag_weight(#[case] tag: &str, #[case] expected: f64) {
        assert_eq!(tag_weight(tag), expected);
    }

    #[rstest]
    #[case(r#"<div class="article-body">x</div>"#, 25.0)]
    #[case(r#"<div id="artikel">x</div>"#, 25.0)]
    #[case(r#"<div class="teaser-list">x</div>"#, -25.0)]
    #[case(r#"<div class="kommentare">x</div>"#, -25.0)]
    #[case(r#"<div class="wrapper sidebar">x</div>"#, -25.0)]
    #[case(r#"<div id="main-footer">x</div>"#, 25.0)]
    #[case(r#"<div id="wrapper" class="sidebar">x</div>"#, -25.0)]
    #[case(r#"<div class="container" id="wrapper">x</div>"#, 0.0)]
    fn test_class_id_weight(#[case] html: &str, #[case] expected: f64) {
        assert_eq!(score_of(html, "div").class_weight, expected);
    }

    #[test]
    fn test_density_counts_length_and_commas() {
        assert_eq!(score_of("<div>Kurzer Satz.</div>", "div").content_density, 0.0);

        let long = format!("<div>{}</div>", "Wort ".repeat(30));
        assert_eq!(score_of(&long, "div").content_density, 1.0);

        let commas = "<div>Bund, Länder, Kommunen, Verbände und Gewerkschaften.</div>";
        assert_eq!(score_of(commas, "div").content_density, 3.0);

        let capped = format!("<div>{}</div>", "a".repeat(900));
        assert_eq!(score_of(&capped, "div").content_density, 3.0);
    }

    #[test]
    fn test_link_density() {
        assert_eq!(score_of("<div>Nur Text ohne Verweise.</div>", "div").link_density, 0.0);
        assert_eq!(score_of(r##"<div><a href="#">Mehr</a></div>"##, "div").link_density, 1.0);
        assert_eq!(score_of("<div></div>", "div").link_density, 0.0);

        let mixed = score_of(r##"<div>Vorher <a href="/a">Link</a> nachher</div>"##, "div").link_density;
        assert!(mixed > 0.0 && mixed < 1.0);
    }

    #[test]
    fn test_article_body_scores_high() {
        let result = score_of(
            r##"<article class="article-body">
                Im Kanzleramt beraten Bund, Länder und Kommunen über die Energiepreise, die Entlastungen und die Netzentgelte.
                <a href="/politik">Politik</a>
                Eine Einigung wird für den Abend erwartet, sagte ein Sprecher, nach stundenlangen Gesprächen.
            </article>"##,
            "article",
        );

        assert_eq!(result.base_score, 10.0);
        assert_eq!(result.class_weight, 25.0);
        assert!(result.link_density > 0.0 && result.link_density < 0.3);
        assert!(result.final_score > 25.0);
    }

    #[test]
    fn test_navigation_scores_negative() {
        let result = score_of(
            r##"<nav class="menu"><a href="/">Startseite</a><a href="/politik">Politik</a><a href="/sport">Sport</a></nav>"##,
            "nav",
        );

        assert_eq!(result.link_density, 1.0);
        assert!(result.final_score <= 0.0);
    }

    #[test]
    fn test_positive_class_halves_link_penalty() {
        let html = r##"<div class="content"><a href="/a">Verweis</a></div><div class="box"><a href="/a">Verweis</a></div>"##;
        let doc = Document::parse(html).unwrap();
        let divs = doc.select("div").unwrap();
        let config = ScoreConfig::default();

        let content = calculate_score(&divs[0], &config);
        let plain = calculate_score(&divs[1], &config);

        assert_eq!(content.final_score, (5.0 + 25.0) * 0.5);
        assert_eq!(plain.final_score, 0.0);
    }
}
