use criterion::{Criterion, black_box, criterion_group, criterion_main};
use newsdesk_core::{ContentExtractor, Document, Pipeline, PipelineConfig, ReadabilityExtractor, RuleSet, TextCleaner, prune_html};

fn bench_prune(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/bild_article.html").unwrap();
    let rules = RuleSet::standard();

    c.bench_function("prune", |b| b.iter(|| prune_html(black_box(&html), rules.selectors())));
}

fn bench_extract(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/bild_article.html").unwrap();
    let rules = RuleSet::standard();
    let pruned = prune_html(&html, rules.selectors());
    let doc = Document::parse_with_base_url(&pruned.html, None).unwrap();
    let extractor = ReadabilityExtractor::default();

    c.bench_function("scoring_and_selection", |b| b.iter(|| extractor.extract(black_box(&doc))));
}

fn bench_clean(c: &mut Criterion) {
    let text = "TTS-Player überspringen\n15.03.2024 - 14:30 Uhr\n\nBerlin – Im Kanzleramt beraten Bund und Länder.\n\n\
                Foto: Michael Kappeler/dpa\nWeiterlesen mit BILDplus\n\nTeilen\nNewsletter\n"
        .repeat(20);
    let rules = RuleSet::standard();
    let cleaner = TextCleaner::new(&rules);

    c.bench_function("clean", |b| b.iter(|| cleaner.clean(black_box(&text))));
}

fn bench_full_pipeline(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/bild_article.html").unwrap();
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();

    c.bench_function("process_html", |b| b.iter(|| pipeline.process_html(black_box(&html), None)));
}

criterion_group!(benches, bench_prune, bench_extract, bench_clean, bench_full_pipeline);
criterion_main!(benches);
