/// Fixed mapping from quality features to a class and confidence
use crate::config::QualityConfig;
use crate::models::QualityFeatures;

/// Lower composite bound of classes 1 to 4; class 5 is everything below.
pub const CLASS_BOUNDARIES: [f32; 4] = [0.75, 0.60, 0.45, 0.30];

/// Weighted composite score in `[0, 1]`.
pub fn composite(f: &QualityFeatures, cfg: &QualityConfig) -> f32 {
    let span = cfg.full_minutiae.saturating_sub(cfg.min_minutiae).max(1) as f32;
    let minutiae = ((f.reliable_minutiae as f32 - cfg.min_minutiae as f32) / span).clamp(0.0, 1.0);
    let blocks: f32 = f
        .block_levels
        .iter()
        .enumerate()
        .map(|(level, frac)| frac * level as f32 / 4.0)
        .sum();
    let s = 0.30 * minutiae
        + 0.25 * blocks
        + 0.15 * f.global_contrast
        + 0.20 * f.flow_consistency
        + 0.10 * f.foreground_ratio;
    s.clamp(0.0, 1.0)
}

/// Class for composite `s` and how far it sits from its class boundaries.
///
/// Classes 1 and 5 are open-ended: only their single boundary counts, so
/// confidence keeps rising toward the extremes.
pub fn classify(s: f32) -> (u8, f32) {
    let top = CLASS_BOUNDARIES[0];
    let bottom = CLASS_BOUNDARIES[CLASS_BOUNDARIES.len() - 1];
    if s >= top {
        return (1, confidence(s - top, 1.0 - top));
    }
    for (k, pair) in CLASS_BOUNDARIES.windows(2).enumerate() {
        let (upper, lower) = (pair[0], pair[1]);
        if s >= lower {
            let d = (s - lower).min(upper - s);
            return (k as u8 + 2, confidence(d, upper - lower));
        }
    }
    (5, confidence(bottom - s, bottom))
}

fn confidence(d: f32, width: f32) -> f32 {
    (0.5 + d.max(0.0) / width).clamp(0.0, 1.0)
}
