//! Pipeline integration tests
use std::sync::Arc;

use httpmock::prelude::*;
use newsdesk_core::*;
use rstest::rstest;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/{}", name)).unwrap()
}

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default()).unwrap()
}

fn expect_success(outcome: PipelineOutcome) -> ExtractedArticle {
    match outcome {
        PipelineOutcome::Success(article) => article,
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn test_news_article_end_to_end() {
    let article = expect_success(pipeline().process_html(&fixture("bild_article.html"), None));

    assert_eq!(article.title, "Kanzler lädt zum Krisengipfel");
    assert_eq!(article.excerpt, "Im Kanzleramt beraten Bund und Länder über die Energiepreise.");
    assert!(article.text.starts_with("Kanzler lädt zum Krisengipfel\n\nBerlin – Im Kanzleramt"));
    assert!(article.text.ends_with("alle Details im Liveblog."));
    assert!(article.text.contains("BILDplus-Abonnenten"));
    assert_eq!(article.length, article.text.chars().count());

    for residue in [
        "TTS-Player",
        "15.03.2024",
        "Foto:",
        "Weiterlesen mit",
        "Zustimmung",
        "Teilen",
        "Startseite",
        "Unterhaltung",
        "Auch interessant",
        "Impressum",
        "dataLayer",
    ] {
        assert!(!article.text.contains(residue), "text still contains {residue:?}:\n{}", article.text);
    }
}

#[test]
fn test_berlin_example() {
    let article = expect_success(pipeline().process_html(&fixture("berlin_dpa.html"), None));

    assert!(article.text.contains("Berlin (dpa) – Example text."));
    assert!(!article.text.contains("Foto:"));
    assert!(!article.text.contains("Startseite"));
    assert!(!article.text.contains("Politik"));
}

#[test]
fn test_navigation_only_page_is_extraction_failure() {
    let outcome = pipeline().process_html(&fixture("nav_only.html"), None);

    assert!(matches!(outcome, PipelineOutcome::ExtractionFailure { .. }));
    assert_eq!(outcome.status_code(), 422);
    assert_eq!(outcome.to_json()["error"], "Artikeltext konnte nicht extrahiert werden");
}

#[test]
fn test_malformed_markup_still_extracts() {
    let article = expect_success(pipeline().process_html(&fixture("malformed.html"), None));
    assert!(article.text.contains("Ein Absatz ohne schließendes Tag"));
}

#[test]
fn test_output_whitespace_invariant() {
    for name in ["bild_article.html", "berlin_dpa.html", "plain_article.html", "malformed.html"] {
        let article = expect_success(pipeline().process_html(&fixture(name), None));
        assert_eq!(article.text, article.text.trim(), "{name}");
        assert!(!article.text.contains("\n\n\n"), "{name}");
    }
}

#[test]
fn test_unclosed_pruned_elements_keep_the_story() {
    let story = "Die Gewerkschaft hat für Montag einen bundesweiten Streik angekündigt, \
                 der den Fern- und Regionalverkehr weitgehend zum Erliegen bringen soll.";
    let html = format!(
        r#"<html><head><title>Streik legt Bahn lahm</title></head><body>
        <article>
            <ul class="tools"><li class="share-bar">Teilen<li>{story}</ul>
            <p class="teaser">Anriss zum Thema
            <p>{story}
            <p>Reisende sollen sich auf Ausfälle einstellen, teilte die Bahn am Sonntag mit, und Fahrten verschieben.
        </article>
        </body></html>"#
    );

    let article = expect_success(pipeline().process_html(&html, None));

    assert!(article.text.contains("bundesweiten Streik"));
    assert!(article.text.contains("Fahrten verschieben."));
    assert!(!article.text.contains("Anriss"));
    assert!(!article.text.contains("Teilen"));
}

#[test]
fn test_pruning_leaves_clean_page_untouched() {
    let html = fixture("plain_article.html");
    let report = prune_html(&html, RuleSet::standard().selectors());

    assert_eq!(report.html, html);
    assert_eq!(report.removed, 0);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_invalid_selector_does_not_stop_other_rules() {
    let rules = RuleSet::new(
        std::iter::once(SanitizerRule::new("div[[class"))
            .chain(RuleSet::standard().selectors().iter().cloned())
            .collect(),
        RuleSet::standard().strip_rules().to_vec(),
    );

    let report = prune_html(&fixture("bild_article.html"), rules.selectors());
    assert_eq!(report.skipped.len(), 1);
    assert!(!report.html.contains("Unterhaltung"));
    assert!(!report.html.contains("Impressum"));

    let pipeline =
        Pipeline::with_extractor(PipelineConfig::default(), Arc::new(rules), ReadabilityExtractor::default()).unwrap();
    let article = expect_success(pipeline.process_html(&fixture("bild_article.html"), None));
    assert!(!article.text.contains("Unterhaltung"));
}

#[test]
fn test_min_length_rejects_short_articles() {
    let config = PipelineConfig { min_length: 300, ..Default::default() };
    let pipeline = Pipeline::new(config).unwrap();
    let outcome = pipeline.process_html(&fixture("berlin_dpa.html"), None);

    assert!(matches!(outcome, PipelineOutcome::ExtractionFailure { .. }));
}

#[rstest]
#[case("Vorspann.\n15.03.2024 - 14:30 Uhr\nNachspann.", "15.03.2024")]
#[case("Vorspann.\nNewsletter\nNachspann.", "Newsletter")]
#[case("Vorspann.\nAuch interessant\nNachspann.", "Auch interessant")]
#[case("Vorspann. Quelle: BILD\nNachspann.", "Quelle")]
fn test_cleaner_strips_residue(#[case] input: &str, #[case] residue: &str) {
    let rules = RuleSet::standard();
    let cleaned = TextCleaner::new(&rules).clean(input);

    assert!(!cleaned.contains(residue), "{cleaned:?}");
    assert!(cleaned.starts_with("Vorspann."));
    assert!(cleaned.ends_with("Nachspann."));
}

#[tokio::test]
async fn test_extract_article_from_server() {
    let server = MockServer::start_async().await;
    let html = fixture("bild_article.html");
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/politik/krisengipfel.bild.html");
            then.status(200).header("content-type", "text/html; charset=utf-8").body(&html);
        })
        .await;

    let outcome = pipeline().extract_article(&server.url("/politik/krisengipfel.bild.html")).await;

    mock.assert_async().await;
    let article = expect_success(outcome);
    assert_eq!(article.title, "Kanzler lädt zum Krisengipfel");
}

#[tokio::test]
async fn test_not_found_is_mirrored() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/weg.html");
            then.status(404).body("<html><body>Seite nicht gefunden</body></html>");
        })
        .await;

    let outcome = pipeline().extract_article(&server.url("/weg.html")).await;

    assert_eq!(
        outcome,
        PipelineOutcome::FetchFailure {
            status: 404,
            message: "Artikel konnte nicht geladen werden: Not Found".to_string()
        }
    );
    assert_eq!(outcome.status_code(), 404);
}

#[tokio::test]
async fn test_invalid_url_is_bad_request() {
    let outcome = pipeline().extract_article("kein-link").await;
    assert_eq!(outcome.status_code(), 400);
}

#[cfg(feature = "feed")]
#[test]
fn test_sitemap_fixture() {
    let entries = parse_news_sitemap(&fixture("news_sitemap.xml"), &FeedConfig::default()).unwrap();
    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();

    assert_eq!(titles, ["Kanzler lädt zum Krisengipfel", "Frühlingsfest auf dem Marktplatz"]);
    assert_eq!(entries[1].date, "2024-03-15T12:00:00+01:00");
}
