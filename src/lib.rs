//! ridgeline - fingerprint minutiae detection, matching and quality scoring
//!
//! Three engines over a caller-owned grayscale buffer:
//! - [`detect_minutiae`]: ridge endings and bifurcations with direction and reliability
//! - [`match_minutiae`] / [`match_records`]: geometric-consistency score between two sets
//! - [`assess_quality`]: ordinal quality class 1 (best) to 5 with a confidence
//!
//! Every engine is a pure function of its inputs and an explicit [`Config`].
//! Scores carry no accept/reject decision; compare against your own threshold.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Immutable engine configuration
pub mod config;
/// Minutiae detection on preprocessed images
pub mod detector;
/// Error taxonomy
pub mod error;
/// Minutiae-set matching
pub mod matcher;
/// Core data structures (images, minutiae, results)
pub mod models;
/// Batch processing, 1:N identification and the owned fingerprint type
pub mod pipeline;
/// Block ridge-flow analysis and oriented binarization
pub mod preprocess;
/// Image quality classification
pub mod quality;
/// File, fixture and statistics helpers for tools and tests
pub mod tools;
/// Angle helpers
pub mod utils;

pub use config::{Config, DetectConfig, MatchConfig, QualityConfig};
pub use detector::{Detection, DetectionStats};
pub use error::{FpError, Result};
pub use models::{
    BinarizedImage, Condition, DIRECTION_BINS, GrayscaleImage, MatchResult, Minutia, MinutiaKind, MinutiaRecord,
    MinutiaSet, Point, QualityFeatures, QualityResult, QualityStatus,
};
pub use pipeline::{Candidate, Fingerprint, assess_batch, detect_batch, identify};

/// Detect minutiae in a row-major 8-bit grayscale buffer
///
/// # Arguments
/// * `pixels` - One byte per pixel, `width * height` bytes
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `ppi` - Scan resolution in pixels per inch
///
/// # Returns
/// The minutiae set and the binarized image, or an invalid-input error
/// (including [`FpError::InvalidConfig`] for a config that fails [`Config::validate`]).
/// A blank or textureless image gives an empty set, not an error.
pub fn detect_minutiae(
    pixels: &[u8],
    width: usize,
    height: usize,
    ppi: u32,
    cfg: &Config,
) -> Result<(MinutiaSet, BinarizedImage)> {
    cfg.validate()?;
    let image = GrayscaleImage::new(pixels, width, height, ppi)?;
    let detection = detector::detect(&image, &cfg.detect);
    Ok((detection.minutiae, detection.binarized))
}

/// Score `probe` against `gallery`
///
/// The probe is always the first argument; swapping them may change the score.
/// `cfg` is trusted as given; check it once with [`Config::validate`] or use
/// [`match_records`], which validates it.
pub fn match_minutiae(probe: &MinutiaSet, gallery: &MinutiaSet, cfg: &Config) -> MatchResult {
    matcher::match_sets(probe, gallery, &cfg.matcher)
}

/// Score two lists of `{x, y, direction}` records
///
/// Malformed records are rejected; lists longer than the cap are silently
/// truncated to their most reliable entries.
pub fn match_records(probe: &[MinutiaRecord], gallery: &[MinutiaRecord], cfg: &Config) -> Result<MatchResult> {
    cfg.validate()?;
    matcher::match_records(probe, gallery, &cfg.matcher)
}

/// Classify the quality of a row-major 8-bit grayscale buffer
///
/// Degenerate images return class 5 flagged with
/// [`QualityStatus::AlgorithmicCondition`]; only shape violations and
/// internal failures are errors.
pub fn assess_quality(pixels: &[u8], width: usize, height: usize, ppi: u32, cfg: &Config) -> Result<QualityResult> {
    cfg.validate()?;
    let image = GrayscaleImage::new(pixels, width, height, ppi)?;
    quality::assess(&image, cfg)
}
