/// Secondary image features for quality classification
use crate::config::QualityConfig;
use crate::models::{GrayscaleImage, MinutiaSet, QualityFeatures};
use crate::preprocess::RidgeMaps;

/// Foreground std at which the contrast feature saturates.
const FULL_CONTRAST_STD: f64 = 64.0;

/// Mean and standard deviation of an iterator of intensities
pub(crate) fn intensity_stats(pixels: impl Iterator<Item = u8>) -> (f64, f64) {
    let (mut n, mut sum, mut sum_sq) = (0u64, 0.0f64, 0.0f64);
    for p in pixels {
        let v = f64::from(p);
        n += 1;
        sum += v;
        sum_sq += v * v;
    }
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / n as f64;
    (mean, (sum_sq / n as f64 - mean * mean).max(0.0).sqrt())
}

/// Collect features from the maps, the detected set and the raw image.
pub(crate) fn collect(
    image: &GrayscaleImage,
    maps: &RidgeMaps,
    minutiae: &MinutiaSet,
    cfg: &QualityConfig,
) -> QualityFeatures {
    let grid = maps.grid();
    let total = grid.len().max(1) as f32;

    let mut levels = [0usize; 5];
    for idx in 0..grid.len() {
        levels[maps.quality_level(idx) as usize] += 1;
    }
    let block_levels = levels.map(|c| c as f32 / total);

    let valid = maps.valid_blocks();
    let foreground = (0..grid.rows()).flat_map(|by| (0..grid.cols()).map(move |bx| (bx, by)));
    let pixels = foreground
        .filter(|&(bx, by)| maps.is_valid(grid.index(bx, by)))
        .flat_map(|(bx, by)| {
            let r = grid.rect(bx, by);
            (r.y0..r.y1).flat_map(move |y| (r.x0..r.x1).map(move |x| image.get(x, y)))
        });
    let (_, std) = intensity_stats(pixels);

    let flow_consistency = if valid == 0 {
        0.0
    } else {
        let sum: f32 = (0..grid.len())
            .filter(|&i| maps.is_valid(i))
            .map(|i| maps.coherence(i))
            .sum();
        sum / valid as f32
    };

    QualityFeatures {
        minutiae_count: minutiae.len(),
        reliable_minutiae: minutiae
            .iter()
            .filter(|m| m.reliability >= cfg.reliable_minutia)
            .count(),
        block_levels,
        foreground_ratio: valid as f32 / total,
        global_contrast: (std / FULL_CONTRAST_STD).clamp(0.0, 1.0) as f32,
        flow_consistency,
    }
}
