use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ridgeline::preprocess::preprocess;
use ridgeline::{DetectConfig, GrayscaleImage};

mod common;

fn bench_preprocess_small(c: &mut Criterion) {
    let pixels = common::fixture_print(256, 256);
    let img = GrayscaleImage::new(&pixels, 256, 256, 500).unwrap();
    let cfg = DetectConfig::default();
    c.bench_function("preprocess_256x256", |b| b.iter(|| preprocess(black_box(&img), &cfg)));
}

fn bench_preprocess_medium(c: &mut Criterion) {
    let pixels = common::fixture_print(512, 512);
    let img = GrayscaleImage::new(&pixels, 512, 512, 500).unwrap();
    let cfg = DetectConfig::default();
    c.bench_function("preprocess_512x512", |b| b.iter(|| preprocess(black_box(&img), &cfg)));
}

fn bench_preprocess_blank(c: &mut Criterion) {
    let pixels = vec![128u8; 512 * 512];
    let img = GrayscaleImage::new(&pixels, 512, 512, 500).unwrap();
    let cfg = DetectConfig::default();
    c.bench_function("preprocess_blank_512x512", |b| b.iter(|| preprocess(black_box(&img), &cfg)));
}

criterion_group!(
    benches,
    bench_preprocess_small,
    bench_preprocess_medium,
    bench_preprocess_blank
);
criterion_main!(benches);
