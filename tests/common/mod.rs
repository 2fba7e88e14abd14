#![allow(dead_code)]

use ridgeline::MinutiaRecord;
use ridgeline::tools::{Pose, Singularity, synthetic_print_posed};

/// Deterministic pseudo-random records at least 15 px apart.
pub fn scatter(seed: u64, n: usize, spread: i32) -> Vec<MinutiaRecord> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as i32
    };
    let mut out: Vec<MinutiaRecord> = Vec::new();
    while out.len() < n {
        let r = MinutiaRecord::new(20 + next() % spread, 20 + next() % spread, next() % 360);
        if out
            .iter()
            .all(|o| (o.x - r.x).pow(2) + (o.y - r.y).pow(2) >= 15 * 15)
        {
            out.push(r);
        }
    }
    out
}

/// Rotate records by `degrees` about (cx, cy), then shift by (dx, dy).
pub fn transform(records: &[MinutiaRecord], degrees: f32, cx: f32, cy: f32, dx: i32, dy: i32) -> Vec<MinutiaRecord> {
    let (s, c) = degrees.to_radians().sin_cos();
    records
        .iter()
        .map(|r| {
            let (px, py) = (r.x as f32 - cx, r.y as f32 - cy);
            MinutiaRecord::new(
                (cx + px * c - py * s).round() as i32 + dx,
                (cy + px * s + py * c).round() as i32 + dy,
                (r.direction + degrees.round() as i32).rem_euclid(360),
            )
        })
        .collect()
}

/// Seeded random singularities at least 40 px apart and 45 px inside the frame.
pub fn singularities(seed: u32, width: usize, height: usize) -> Vec<Singularity> {
    let margin = 45.0;
    let (span_x, span_y) = (width as f32 - 2.0 * margin, height as f32 - 2.0 * margin);
    let wanted = (span_x * span_y / 2500.0) as usize;
    let mut state = seed.wrapping_mul(2654435761).max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state >> 8) as f32 / (1u32 << 24) as f32
    };
    let mut out: Vec<Singularity> = Vec::new();
    for attempt in 0..wanted * 50 {
        if out.len() == wanted {
            break;
        }
        let x = margin + span_x * next();
        let y = margin + span_y * next();
        if out.iter().all(|s| (s.x - x).powi(2) + (s.y - y).powi(2) >= 40.0 * 40.0) {
            let charge = if attempt % 2 == 0 { 1.0 } else { -1.0 };
            out.push(Singularity::new(x, y, charge));
        }
    }
    out
}

/// Synthetic print with the seed's singularities and a pose.
pub fn print(seed: u32, width: usize, height: usize, pose: Pose) -> Vec<u8> {
    synthetic_print_posed(width, height, 9.0, &singularities(seed, width, height), pose)
}
