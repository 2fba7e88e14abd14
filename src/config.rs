//! Immutable engine configuration
//!
//! Every engine takes its configuration as an explicit argument. A process
//! that wants environment overrides calls [`Config::from_env`] once at start
//! and shares the resulting value; nothing here is global or mutable.

use crate::error::{FpError, Result};

/// Largest matcher cap; pair and association tables index minutiae as `u16`.
pub const MAX_MATCH_MINUTIAE: usize = u16::MAX as usize;

fn parse_env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_f32(name: &str, default: f32) -> f32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Preprocessor and minutiae detector parameters.
///
/// Pixel lengths are given for 500 ppi and scaled by [`DetectConfig::scaled`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectConfig {
    /// Block edge at 500 ppi.
    pub block_size_500: usize,
    /// Blocks with an intensity std below this are low contrast.
    pub min_block_contrast: f32,
    /// Std at which a block's contrast score saturates.
    pub full_block_contrast: f32,
    /// Blocks with orientation coherence below this are low flow.
    pub min_block_coherence: f32,
    /// Circular variance of neighbouring orientations above which a block is high curvature.
    pub high_curvature_threshold: f32,
    /// Ridge islands and holes smaller than this many pixels are removed.
    pub min_component_area: usize,
    /// Minutiae closer than this to the image edge are discarded.
    pub border_margin: usize,
    /// Maximum ridge trace length used to orient a minutia.
    pub trace_length: usize,
    /// Spurs, short ridges and bridges up to this length are treated as noise.
    pub spur_length: usize,
    /// Distance under which opposing endings are taken as a broken ridge.
    pub break_distance: f32,
    /// Minutiae closer than this are duplicates; the later one is dropped.
    pub min_separation: f32,
    /// Detections below this reliability are discarded.
    pub min_reliability: f32,
    /// Cap on the returned minutiae set.
    pub max_minutiae: usize,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            block_size_500: 12,
            min_block_contrast: 8.0,
            full_block_contrast: 40.0,
            min_block_coherence: 0.25,
            high_curvature_threshold: 0.35,
            min_component_area: 12,
            border_margin: 8,
            trace_length: 12,
            spur_length: 8,
            break_distance: 8.0,
            min_separation: 4.0,
            min_reliability: 0.05,
            max_minutiae: 150,
        }
    }
}

impl DetectConfig {
    /// Block size in pixels for the given resolution.
    pub fn block_size(&self, ppi: u32) -> usize {
        self.scaled(self.block_size_500, ppi).max(8)
    }

    /// Scale a 500 ppi pixel length to `ppi`, never below one pixel.
    pub fn scaled(&self, length_500: usize, ppi: u32) -> usize {
        ((length_500 as f32 * ppi as f32 / 500.0).round() as usize).max(1)
    }

    /// Scale a 500 ppi distance to `ppi`.
    pub fn scaled_f32(&self, length_500: f32, ppi: u32) -> f32 {
        length_500 * ppi as f32 / 500.0
    }
}

/// Minutiae-set matcher parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    /// Sets are truncated to this many most-reliable entries.
    pub max_minutiae: usize,
    /// Sets with fewer entries score 0.
    pub min_computable_minutiae: usize,
    /// Pairs closer than this are too short to give a stable bearing.
    pub min_pair_distance: f32,
    /// Pairs farther apart than this are not tabled.
    pub max_pair_distance: f32,
    /// Absolute distance tolerance in pixels.
    pub distance_tolerance: f32,
    /// Relative distance tolerance, applied to the mean of the two distances.
    pub distance_tolerance_ratio: f32,
    /// Tolerance on relative minutia angles, degrees.
    pub angle_tolerance: i32,
    /// Tolerance on the implied rotation within one cluster, degrees.
    pub rotation_tolerance: i32,
    /// Upper bound on consistency checks per match; best cluster so far is returned.
    pub budget: u64,
    /// Upper bound on seed associations explored per match.
    pub max_seeds: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_minutiae: 150,
            min_computable_minutiae: 10,
            min_pair_distance: 5.0,
            max_pair_distance: 125.0,
            distance_tolerance: 3.0,
            distance_tolerance_ratio: 0.06,
            angle_tolerance: 12,
            rotation_tolerance: 15,
            budget: 4_000_000,
            max_seeds: 300,
        }
    }
}

impl MatchConfig {
    /// Distance tolerance for a pair of distances.
    pub fn distance_tolerance_for(&self, a: f32, b: f32) -> f32 {
        self.distance_tolerance
            .max(self.distance_tolerance_ratio * (a + b) * 0.5)
    }
}

/// Quality scorer parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityConfig {
    /// Fewer detected minutiae than this is a degenerate image.
    pub min_minutiae: usize,
    /// Reliability at which a minutia counts as reliable.
    pub reliable_minutia: f32,
    /// Reliable minutiae count at which the minutiae feature saturates.
    pub full_minutiae: usize,
    /// Global std below which the image is treated as uniform.
    pub uniform_std: f32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_minutiae: 5,
            reliable_minutia: 0.5,
            full_minutiae: 40,
            uniform_std: 1.0,
        }
    }
}

/// Complete configuration threaded through every call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Config {
    /// Preprocessing and detection.
    pub detect: DetectConfig,
    /// Matching.
    pub matcher: MatchConfig,
    /// Quality scoring.
    pub quality: QualityConfig,
}

impl Config {
    /// Defaults with overrides read from `FP_*` environment variables.
    ///
    /// Malformed values fall back to the default silently.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        let cap = parse_env_usize("FP_MAX_MINUTIAE", cfg.matcher.max_minutiae);
        cfg.detect.max_minutiae = cap;
        cfg.matcher.max_minutiae = cap;
        cfg.matcher.min_computable_minutiae = parse_env_usize(
            "FP_MIN_COMPUTABLE_MINUTIAE",
            cfg.matcher.min_computable_minutiae,
        );
        cfg.matcher.budget = parse_env_u64("FP_MATCH_BUDGET", cfg.matcher.budget);
        cfg.detect.min_reliability =
            parse_env_f32("FP_MIN_RELIABILITY", cfg.detect.min_reliability);
        cfg.detect.min_block_contrast =
            parse_env_f32("FP_MIN_BLOCK_CONTRAST", cfg.detect.min_block_contrast);
        cfg.detect.min_block_coherence =
            parse_env_f32("FP_MIN_BLOCK_COHERENCE", cfg.detect.min_block_coherence);
        cfg
    }

    /// Reject values that would make the engines meaningless.
    ///
    /// The fallible entry points in the crate root call this on every call.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detect;
        if d.block_size_500 == 0 {
            return Err(FpError::InvalidConfig("block size must be positive".into()));
        }
        if !(0.0..=1.0).contains(&d.min_reliability) {
            return Err(FpError::InvalidConfig(format!(
                "min_reliability {} outside [0, 1]",
                d.min_reliability
            )));
        }
        if !(0.0..=1.0).contains(&d.min_block_coherence) {
            return Err(FpError::InvalidConfig(format!(
                "min_block_coherence {} outside [0, 1]",
                d.min_block_coherence
            )));
        }
        if d.full_block_contrast <= d.min_block_contrast {
            return Err(FpError::InvalidConfig(
                "full_block_contrast must exceed min_block_contrast".into(),
            ));
        }
        if d.max_minutiae == 0 || self.matcher.max_minutiae == 0 {
            return Err(FpError::InvalidConfig("minutiae cap must be positive".into()));
        }
        // Matcher indices are stored as u16
        if self.matcher.max_minutiae > MAX_MATCH_MINUTIAE {
            return Err(FpError::InvalidConfig(format!(
                "matcher minutiae cap {} exceeds {MAX_MATCH_MINUTIAE}",
                self.matcher.max_minutiae
            )));
        }
        let m = &self.matcher;
        if m.max_pair_distance <= m.min_pair_distance {
            return Err(FpError::InvalidConfig(
                "max_pair_distance must exceed min_pair_distance".into(),
            ));
        }
        if !(0..180).contains(&m.angle_tolerance) || !(0..180).contains(&m.rotation_tolerance) {
            return Err(FpError::InvalidConfig("angle tolerances must be in [0, 180)".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_block_size_scales_with_ppi() {
        let d = DetectConfig::default();
        assert_eq!(d.block_size(500), 12);
        assert_eq!(d.block_size(1000), 24);
        // Never below 8 pixels, even at very low resolution.
        assert_eq!(d.block_size(100), 8);
    }

    #[test]
    fn test_distance_tolerance() {
        let m = MatchConfig::default();
        assert_eq!(m.distance_tolerance_for(10.0, 10.0), 3.0);
        assert!((m.distance_tolerance_for(100.0, 100.0) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.matcher.max_pair_distance = 1.0;
        assert!(matches!(cfg.validate(), Err(FpError::InvalidConfig(_))));

        let mut cfg = Config::default();
        cfg.detect.min_reliability = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.detect.max_minutiae = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.matcher.max_minutiae = MAX_MATCH_MINUTIAE + 1;
        assert!(matches!(cfg.validate(), Err(FpError::InvalidConfig(_))));
        cfg.matcher.max_minutiae = MAX_MATCH_MINUTIAE;
        assert!(cfg.validate().is_ok());

        let mut cfg = Config::default();
        cfg.matcher.rotation_tolerance = -1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_parse_env_fallback() {
        assert_eq!(parse_env_usize("FP_TEST_UNSET_VARIABLE_XYZ", 7), 7);
        assert_eq!(parse_env_f32("FP_TEST_UNSET_VARIABLE_XYZ", 0.5), 0.5);
    }
}
