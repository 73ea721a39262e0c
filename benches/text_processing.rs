//! Benchmarks for subtitle filtering and file naming
//!
//! Tests performance of the sign cue filter and canonical name generation.

use anidrop::metadata::naming::{canonical_file_name, shorten_title};
use anidrop::pipeline::Service;
use anidrop_av::filter_sign_cues;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const HEADER: &str = "[Script Info]\nTitle: Episode\nScriptType: v4.00+\n\n[V4+ Styles]\nFormat: Name, Fontname, Fontsize\nStyle: Default,Arial,48\nStyle: Text Date,Arial,40\n\n[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n";

/// Build a subtitle file with `cues` dialogue lines, every fifth a sign.
fn subtitle(cues: usize) -> String {
    let mut content = String::from(HEADER);
    for i in 0..cues {
        let line = match i % 5 {
            0 => format!("Dialogue: 0,0:00:{:02}.00,0:00:{:02}.50,Default,,0,0,0,,{{\\pos(320,50)}}Store sign {}\n", i % 60, i % 60, i),
            _ => format!("Dialogue: 0,0:00:{:02}.00,0:00:{:02}.50,Default,,0,0,0,,Line of dialogue number {}\n", i % 60, i % 60, i),
        };
        content.push_str(&line);
    }
    content
}

fn bench_sign_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("sign_filter");

    for cues in [100, 1_000, 10_000] {
        let content = subtitle(cues);
        group.bench_with_input(BenchmarkId::from_parameter(cues), &content, |b, content| {
            b.iter(|| filter_sign_cues(black_box(content)));
        });
    }

    group.finish();
}

fn bench_naming(c: &mut Criterion) {
    let mut group = c.benchmark_group("naming");

    group.bench_function("canonical_file_name/simple", |b| {
        b.iter(|| {
            canonical_file_name(
                black_box("Show_S01E02.mkv"),
                Service::Crunchy,
                25,
                "1080p",
            )
        });
    });

    group.bench_function("canonical_file_name/release", |b| {
        b.iter(|| {
            canonical_file_name(
                black_box("[SubsPlease] Jujutsu Kaisen - 24 (1080p) [ABCD1234].mkv"),
                Service::Hidive,
                25,
                "1080p",
            )
        });
    });

    group.bench_function("shorten_title/truncate", |b| {
        b.iter(|| shorten_title(black_box("Abcdefghij Klmnopqrst Uvwxyz Abcdefghij"), 25));
    });

    group.finish();
}

criterion_group!(benches, bench_sign_filter, bench_naming);
criterion_main!(benches);
