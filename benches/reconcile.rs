//! Benchmarks for the CPU-bound half of a markup request: segmentation,
//! candidate building, diff mapping and reconciliation.
//!
//! Run with: cargo bench --bench reconcile

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gecmark::config::GibberishConfig;
use gecmark::diff::diff;
use gecmark::gibberish::{build_candidates, score_candidates};
use gecmark::reconcile::reconcile;
use gecmark::segmenter::{segment, UnicodeSentenceSplitter};
use gecmark::{GibbScores, Misspell, MisspellKind};
use std::hint::black_box;

fn generate_text(paragraphs: usize) -> String {
    let paragraph = "The cat sat on the mat. It was a warm day and the sun was out. \
                     Nobody knew where the dog had gone.";
    vec![paragraph; paragraphs].join("\n\n")
}

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");

    for paragraphs in [1, 10, 100] {
        let text = generate_text(paragraphs);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &text, |b, text| {
            b.iter(|| segment(black_box(text), &UnicodeSentenceSplitter));
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let config = GibberishConfig::default();

    for paragraphs in [1, 10, 100] {
        let text = generate_text(paragraphs);
        let corrected = text.replace("was a warm", "was warm");
        let units = segment(&text, &UnicodeSentenceSplitter);
        let misspells = vec![Misspell {
            index: 4,
            length: 3,
            kind: MisspellKind::SpellingMistake,
            suggestions: Vec::new(),
        }];

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &text, |b, text| {
            b.iter(|| {
                let spans = diff(text, &corrected, &misspells).unwrap();
                let mut candidates = build_candidates(text, &units);
                score_candidates(text, &mut candidates, config.max_batch, |texts| {
                    Ok(vec![GibbScores::default(); texts.len()])
                })
                .unwrap();
                black_box(reconcile(text, spans, &misspells, candidates, &config))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_segment, bench_reconcile);
criterion_main!(benches);
