use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ridgeline::{Config, MinutiaRecord, match_records};

/// Pseudo-random record set with a fixed seed.
fn scatter(seed: u64, n: usize, spread: i32) -> Vec<MinutiaRecord> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            let mut next = || {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as i32
            };
            MinutiaRecord::new(next() % spread, next() % spread, next() % 360)
        })
        .collect()
}

fn bench_match_genuine(c: &mut Criterion) {
    let a = scatter(1, 60, 400);
    let cfg = Config::default();
    c.bench_function("match_self_60", |b| {
        b.iter(|| match_records(black_box(&a), black_box(&a), &cfg))
    });
}

fn bench_match_impostor(c: &mut Criterion) {
    let a = scatter(1, 60, 400);
    let b_set = scatter(2, 60, 400);
    let cfg = Config::default();
    c.bench_function("match_impostor_60", |b| {
        b.iter(|| match_records(black_box(&a), black_box(&b_set), &cfg))
    });
}

fn bench_match_full_cap(c: &mut Criterion) {
    let a = scatter(3, 150, 500);
    let b_set = scatter(4, 150, 500);
    let cfg = Config::default();
    c.bench_function("match_impostor_150", |b| {
        b.iter(|| match_records(black_box(&a), black_box(&b_set), &cfg))
    });
}

criterion_group!(
    benches,
    bench_match_genuine,
    bench_match_impostor,
    bench_match_full_cap
);
criterion_main!(benches);
