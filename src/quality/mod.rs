//! Automated image quality classification
//!
//! Runs its own preprocessing and detection pass, derives secondary
//! features from it, and maps them to an ordinal class 1 (best) to 5
//! (worst) with the fixed procedure in [`classifier`].

pub mod classifier;
pub(crate) mod features;

use log::debug;

use crate::config::Config;
use crate::detector::detect_preprocessed;
use crate::error::{FpError, Result};
use crate::models::{Condition, GrayscaleImage, MinutiaSet, QualityFeatures, QualityResult, QualityStatus};
use crate::preprocess::preprocess;

/// Worst class, returned for degenerate input
pub const WORST_CLASS: u8 = 5;

/// Classify the quality of `image`.
///
/// Degenerate images (no valid blocks, near-uniform intensity, too few
/// minutiae) still produce a result, flagged with
/// [`QualityStatus::AlgorithmicCondition`]. Non-finite features are an
/// internal failure and produce no result.
pub fn assess(image: &GrayscaleImage, cfg: &Config) -> Result<QualityResult> {
    let (_, global_std) = features::intensity_stats(image.as_bytes().iter().copied());
    let pre = preprocess(image, &cfg.detect);

    if pre.condition == Some(Condition::EmptyImage) || (global_std as f32) < cfg.quality.uniform_std {
        debug!("quality: empty image (global std {global_std:.2})");
        let features = features::collect(image, &pre.maps, &MinutiaSet::empty(), &cfg.quality);
        return Ok(degenerate(Condition::EmptyImage, features));
    }

    let detection = detect_preprocessed(&pre, image.ppi(), &cfg.detect);
    let features = features::collect(image, &pre.maps, &detection.minutiae, &cfg.quality);
    if !features.is_finite() {
        return Err(FpError::SystemFailure(format!(
            "non-finite quality features: {features:?}"
        )));
    }
    if features.minutiae_count < cfg.quality.min_minutiae {
        debug!("quality: too few minutiae ({})", features.minutiae_count);
        return Ok(degenerate(Condition::TooFewMinutiae, features));
    }

    let s = classifier::composite(&features, &cfg.quality);
    let (class, confidence) = classifier::classify(s);
    debug!("quality: {features:?} -> composite {s:.3}, class {class}, confidence {confidence:.2}");
    Ok(QualityResult {
        class,
        confidence,
        status: QualityStatus::Success,
        features,
    })
}

fn degenerate(condition: Condition, features: QualityFeatures) -> QualityResult {
    QualityResult {
        class: WORST_CLASS,
        confidence: 1.0,
        status: QualityStatus::AlgorithmicCondition(condition),
        features,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Singularity, synthetic_print};

    #[test]
    fn test_constant_image_is_worst_class() {
        let data = vec![77u8; 256 * 256];
        let img = GrayscaleImage::new(&data, 256, 256, 500).unwrap();
        let q = assess(&img, &Config::default()).unwrap();
        assert_eq!(q.class, WORST_CLASS);
        assert_eq!(q.confidence, 1.0);
        assert_eq!(q.status, QualityStatus::AlgorithmicCondition(Condition::EmptyImage));
    }

    #[test]
    fn test_empty_image_still_reports_features() {
        let data = vec![77u8; 256 * 256];
        let img = GrayscaleImage::new(&data, 256, 256, 500).unwrap();
        let q = assess(&img, &Config::default()).unwrap();
        assert_eq!(q.features.block_levels, [1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(q.features.foreground_ratio, 0.0);
        assert_eq!(q.features.minutiae_count, 0);
        assert!(q.features.is_finite());
    }

    #[test]
    fn test_stripes_without_minutiae_are_degenerate() {
        let data = synthetic_print(160, 160, 9.0, &[]);
        let img = GrayscaleImage::new(&data, 160, 160, 500).unwrap();
        let q = assess(&img, &Config::default()).unwrap();
        assert_eq!(q.class, WORST_CLASS);
        assert_eq!(q.status, QualityStatus::AlgorithmicCondition(Condition::TooFewMinutiae));
        assert!(q.features.foreground_ratio > 0.9);
    }

    #[test]
    fn test_result_is_in_range() {
        let singularities: Vec<_> = (0..3)
            .flat_map(|i| (0..3).map(move |j| Singularity::new(60.0 + 60.0 * i as f32, 60.0 + 60.0 * j as f32, 1.0)))
            .collect();
        let data = synthetic_print(240, 240, 9.0, &singularities);
        let img = GrayscaleImage::new(&data, 240, 240, 500).unwrap();
        let q = assess(&img, &Config::default()).unwrap();
        assert!((1..=5).contains(&q.class));
        assert!((0.0..=1.0).contains(&q.confidence));
        let sum: f32 = q.features.block_levels.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }
}
