//! Benchmarks for anidrop-parser.
//!
//! Run with: cargo bench

use anidrop_parser::parse;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const SAMPLES: &[&str] = &[
    "[SubsPlease] Jujutsu Kaisen - 24 (1080p) [ABCD1234].mkv",
    "[Judas] Chainsaw Man - S01E12 [1080p][HEVC x265 10bit][Dual-Audio].mkv",
    "[SubGroup] Attack on Titan - The Final Season - 28 [1080p] [ENG].mkv",
    "Dungeon.Meshi.S01E10.1080p.WEB.H264.mkv",
    "Mushoku Tensei 2nd Season - 05 [1080p].mkv",
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(SAMPLES.len() as u64));

    group.bench_function("anime_samples", |b| {
        b.iter(|| {
            for sample in SAMPLES {
                black_box(parse(black_box(sample)));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
