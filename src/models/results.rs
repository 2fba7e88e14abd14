use serde::{Deserialize, Serialize};

/// Well-formed input that is degenerate for the algorithm
///
/// Results carrying a condition are still valid, just flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// No block passed the contrast and flow checks
    EmptyImage,
    /// Too few minutiae to analyse
    TooFewMinutiae,
}

/// Outcome of comparing a probe set against a gallery set
///
/// There is no accept/reject decision here; compare `score` against your own
/// threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Geometric-consistency score, 0 when nothing corroborates
    pub score: u32,
    /// Probe minutiae considered, after truncation
    pub probe_count: usize,
    /// Gallery minutiae considered, after truncation
    pub gallery_count: usize,
}

/// Status of a quality computation that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityStatus {
    /// Normal computation
    Success,
    /// Degenerate input; the class is the documented fallback
    AlgorithmicCondition(Condition),
}

/// Secondary features the quality class is derived from
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityFeatures {
    /// Minutiae detected
    pub minutiae_count: usize,
    /// Minutiae at or above the reliable threshold
    pub reliable_minutiae: usize,
    /// Fraction of blocks at each quality level 0 (invalid) to 4 (best)
    pub block_levels: [f32; 5],
    /// Fraction of blocks that are valid
    pub foreground_ratio: f32,
    /// Foreground intensity spread, normalised to [0, 1]
    pub global_contrast: f32,
    /// Mean orientation coherence over valid blocks
    pub flow_consistency: f32,
}

impl QualityFeatures {
    /// All floating features are finite.
    pub fn is_finite(&self) -> bool {
        self.block_levels.iter().all(|v| v.is_finite())
            && self.foreground_ratio.is_finite()
            && self.global_contrast.is_finite()
            && self.flow_consistency.is_finite()
    }
}

/// Overall image quality
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityResult {
    /// Ordinal class, 1 (best) to 5 (worst)
    pub class: u8,
    /// Distance from the nearest class boundary, in [0, 1]
    pub confidence: f32,
    /// Whether the input was degenerate
    pub status: QualityStatus,
    /// Features the class was computed from
    pub features: QualityFeatures,
}

impl QualityResult {
    /// Human-readable label for the class
    pub fn label(&self) -> &'static str {
        match self.class {
            1 => "excellent",
            2 => "very good",
            3 => "good",
            4 => "fair",
            _ => "poor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_label() {
        let q = QualityResult {
            class: 2,
            confidence: 0.8,
            status: QualityStatus::Success,
            features: QualityFeatures::default(),
        };
        assert_eq!(q.label(), "very good");
    }

    #[test]
    fn test_features_finite() {
        let mut f = QualityFeatures::default();
        assert!(f.is_finite());
        f.flow_consistency = f32::NAN;
        assert!(!f.is_finite());
    }

    #[test]
    fn test_status_json() {
        let s = QualityStatus::AlgorithmicCondition(Condition::EmptyImage);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"algorithmic_condition":"empty_image"}"#);
    }
}
