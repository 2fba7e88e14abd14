//! Minutiae detection
//!
//! Runs on the preprocessor's output:
//! - Cleanup of ridge islands and valley holes (connected components)
//! - Zhang–Suen thinning to a one-pixel skeleton
//! - Crossing-number candidates inside valid blocks, away from the border
//! - Ridge tracing for direction and false-minutia removal
//! - Reliability from block contrast, flow and distance to invalid area

pub(crate) mod connected_components;
pub(crate) mod filter;
pub(crate) mod skeleton;
pub(crate) mod thinning;

use std::f32::consts::PI;

use log::{debug, trace};
use serde::Serialize;

use crate::config::DetectConfig;
use crate::models::matrix::{BACKGROUND, RIDGE};
use crate::models::{BinarizedImage, Condition, GrayscaleImage, Minutia, MinutiaKind, MinutiaSet};
use crate::preprocess::{Preprocessed, RidgeMaps, preprocess};
use crate::utils::angles::{angle_difference, snap_to_axis, to_degrees_bin};
use filter::{PositionIndex, Removal, Traced};
use skeleton::{Candidate, Skeleton};

/// Blocks from invalid area at which the distance score saturates.
const FULL_DISTANCE_BLOCKS: f32 = 4.0;
/// Reliability multiplier inside high-curvature blocks.
const CURVATURE_PENALTY: f32 = 0.75;

/// Stage-level counters for one detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectionStats {
    /// Ridge islands removed before thinning
    pub islands_removed: usize,
    /// Valley holes filled before thinning
    pub holes_filled: usize,
    /// Ending candidates from the crossing number
    pub ending_candidates: usize,
    /// Bifurcation candidates from the crossing number
    pub bifurcation_candidates: usize,
    /// Bifurcations whose branches could not be resolved
    pub unresolved: usize,
    /// Removed as spurs
    pub spurs: usize,
    /// Removed as short ridges
    pub short_ridges: usize,
    /// Removed as bridges
    pub bridges: usize,
    /// Removed as broken ridges
    pub broken_ridges: usize,
    /// Removed as duplicates
    pub duplicates: usize,
    /// Dropped for low reliability
    pub unreliable: usize,
    /// Dropped by the cardinality cap
    pub truncated: usize,
    /// Minutiae returned
    pub detected: usize,
}

/// Output of one detection
#[derive(Debug, Clone)]
pub struct Detection {
    /// Detected minutiae, capped and in raster order
    pub minutiae: MinutiaSet,
    /// Cleaned ridge image the minutiae were extracted from
    pub binarized: BinarizedImage,
    /// `Some(EmptyImage)` when no block was valid
    pub condition: Option<Condition>,
    /// Stage counters
    pub stats: DetectionStats,
}

/// Preprocess `image` and detect minutiae in it.
pub fn detect(image: &GrayscaleImage, cfg: &DetectConfig) -> Detection {
    let pre = preprocess(image, cfg);
    detect_preprocessed(&pre, image.ppi(), cfg)
}

/// Detect minutiae from an existing preprocessing result.
pub fn detect_preprocessed(pre: &Preprocessed, ppi: u32, cfg: &DetectConfig) -> Detection {
    let mut stats = DetectionStats::default();
    if pre.condition == Some(Condition::EmptyImage) {
        return Detection {
            minutiae: MinutiaSet::empty(),
            binarized: pre.binarized.clone(),
            condition: pre.condition,
            stats,
        };
    }

    let width = pre.binarized.width();
    let height = pre.binarized.height();
    let maps = &pre.maps;

    // Cleanup
    let mut mask = pre.binarized.to_mask();
    let min_area = cfg.scaled(cfg.min_component_area, ppi);
    stats.islands_removed =
        connected_components::remove_small_components(&mut mask, width, height, 1, min_area, true);
    stats.holes_filled =
        connected_components::remove_small_components(&mut mask, width, height, 0, min_area, false);
    let binarized = BinarizedImage::from_raw(
        width,
        height,
        mask.iter().map(|&v| if v == 1 { RIDGE } else { BACKGROUND }).collect(),
    );

    let passes = thinning::zhang_suen(&mut mask, width, height);
    let skeleton = Skeleton::new(width, height, mask);
    trace!("detect: thinning took {passes} passes");

    let margin = cfg.scaled(cfg.border_margin, ppi);
    let inside = |x: usize, y: usize| {
        x >= margin && y >= margin && x + margin < width && y + margin < height && maps.is_valid_pixel(x, y)
    };
    let candidates = skeleton.candidates(inside);
    stats.ending_candidates = candidates
        .iter()
        .filter(|c| c.kind == MinutiaKind::RidgeEnding)
        .count();
    stats.bifurcation_candidates = candidates.len() - stats.ending_candidates;

    let trace_len = cfg.scaled(cfg.trace_length, ppi);
    let mut items: Vec<Traced> = Vec::with_capacity(candidates.len());
    for c in &candidates {
        match trace_candidate(&skeleton, maps, c, trace_len) {
            Some(t) => items.push(t),
            None => stats.unresolved += 1,
        }
    }

    let index = PositionIndex::new(width, height, &items);
    filter::remove_short_structures(&mut items, &index, cfg.scaled(cfg.spur_length, ppi));
    filter::remove_broken_ridges(&mut items, cfg.scaled_f32(cfg.break_distance, ppi));
    filter::remove_duplicates(&mut items, cfg.scaled_f32(cfg.min_separation, ppi));

    let mut minutiae = Vec::new();
    for item in &items {
        match item.removed {
            Some(Removal::Spur) => stats.spurs += 1,
            Some(Removal::ShortRidge) => stats.short_ridges += 1,
            Some(Removal::Bridge) => stats.bridges += 1,
            Some(Removal::BrokenRidge) => stats.broken_ridges += 1,
            Some(Removal::Duplicate) => stats.duplicates += 1,
            None => {
                let r = reliability(maps, maps.grid().index_of_pixel(item.x, item.y), cfg);
                if r < cfg.min_reliability {
                    stats.unreliable += 1;
                    continue;
                }
                minutiae.push(Minutia {
                    x: item.x as u32,
                    y: item.y as u32,
                    direction: item.direction as u16,
                    kind: item.kind,
                    reliability: r,
                });
            }
        }
    }

    let found = minutiae.len();
    let minutiae = MinutiaSet::new(minutiae, cfg.max_minutiae);
    stats.truncated = found - minutiae.len();
    stats.detected = minutiae.len();
    debug!("detect: {stats:?}");

    Detection {
        minutiae,
        binarized,
        condition: None,
        stats,
    }
}

/// Trace a candidate's branches and derive its direction.
///
/// Returns `None` for a bifurcation without three distinct branches.
fn trace_candidate(skeleton: &Skeleton, maps: &RidgeMaps, c: &Candidate, limit: usize) -> Option<Traced> {
    let origin = (c.x, c.y);
    let starts = skeleton.branch_starts(c.x, c.y);
    let traces: Vec<_> = match c.kind {
        MinutiaKind::RidgeEnding => starts
            .first()
            .map(|&s| vec![skeleton.trace(origin, s, limit)])
            .unwrap_or_default(),
        MinutiaKind::Bifurcation if starts.len() == 3 => {
            starts.iter().map(|&s| skeleton.trace(origin, s, limit)).collect()
        }
        MinutiaKind::Bifurcation => Vec::new(),
    };
    if traces.is_empty() {
        return None;
    }

    let bearing = |t: &skeleton::Trace| (t.y as f32 - c.y as f32).atan2(t.x as f32 - c.x as f32);
    let raw = match c.kind {
        // Away from the ridge body
        MinutiaKind::RidgeEnding => bearing(&traces[0]) + PI,
        // Away from the stem, which is the branch outside the closest pair
        MinutiaKind::Bifurcation => {
            let deg: Vec<i32> = traces.iter().map(|t| to_degrees_bin(bearing(t))).collect();
            let pairs = [(0, 1, 2), (0, 2, 1), (1, 2, 0)];
            let (_, _, stem) = pairs
                .iter()
                .copied()
                .min_by_key(|&(a, b, _)| angle_difference(deg[a], deg[b]))
                .unwrap_or((0, 1, 2));
            bearing(&traces[stem]) + PI
        }
    };

    let axis = maps.orientation(maps.grid().index_of_pixel(c.x, c.y));
    Some(Traced {
        x: c.x,
        y: c.y,
        kind: c.kind,
        direction: to_degrees_bin(snap_to_axis(raw, axis)),
        traces,
        removed: None,
    })
}

/// Reliability of a minutia in block `idx`, in `[0, 1]`.
fn reliability(maps: &RidgeMaps, idx: usize, cfg: &DetectConfig) -> f32 {
    let contrast = ((maps.contrast(idx) - cfg.min_block_contrast)
        / (cfg.full_block_contrast - cfg.min_block_contrast))
        .clamp(0.0, 1.0);
    let coherence = maps.coherence(idx).clamp(0.0, 1.0);
    let distance = (f32::from(maps.distance_to_invalid(idx)) / FULL_DISTANCE_BLOCKS).clamp(0.0, 1.0);
    let mut r = 0.35 * contrast + 0.35 * coherence + 0.30 * distance;
    if maps.is_high_curvature(idx) {
        r *= CURVATURE_PENALTY;
    }
    r.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Singularity, synthetic_print};

    #[test]
    fn test_constant_image_yields_nothing() {
        let data = vec![200u8; 128 * 128];
        let img = GrayscaleImage::new(&data, 128, 128, 500).unwrap();
        let d = detect(&img, &DetectConfig::default());
        assert!(d.minutiae.is_empty());
        assert_eq!(d.condition, Some(Condition::EmptyImage));
        assert_eq!(d.binarized.ridge_pixels(), 0);
        assert_eq!(d.stats, DetectionStats::default());
    }

    #[test]
    fn test_plain_stripes_have_no_interior_minutiae() {
        let data = synthetic_print(160, 160, 9.0, &[]);
        let img = GrayscaleImage::new(&data, 160, 160, 500).unwrap();
        let d = detect(&img, &DetectConfig::default());
        assert!(d.condition.is_none());
        assert!(d.minutiae.len() <= 2, "found {}", d.minutiae.len());
    }

    #[test]
    fn test_singularity_produces_minutia_nearby() {
        let data = synthetic_print(160, 160, 9.0, &[Singularity::new(80.0, 80.0, 1.0)]);
        let img = GrayscaleImage::new(&data, 160, 160, 500).unwrap();
        let d = detect(&img, &DetectConfig::default());
        let near = d.minutiae.iter().any(|m| {
            let dx = m.x as f32 - 80.0;
            let dy = m.y as f32 - 80.0;
            (dx * dx + dy * dy).sqrt() < 10.0
        });
        assert!(near, "minutiae: {:?}", d.minutiae);
    }

    #[test]
    fn test_minutiae_respect_invariants() {
        let singularities = [
            Singularity::new(50.0, 60.0, 1.0),
            Singularity::new(120.0, 70.0, -1.0),
            Singularity::new(80.0, 140.0, 1.0),
        ];
        let data = synthetic_print(180, 200, 9.0, &singularities);
        let img = GrayscaleImage::new(&data, 180, 200, 500).unwrap();
        let cfg = DetectConfig::default();
        let pre = preprocess(&img, &cfg);
        let d = detect_preprocessed(&pre, 500, &cfg);
        for m in &d.minutiae {
            assert!((m.x as usize) < 180 && (m.y as usize) < 200);
            assert!(pre.maps.is_valid_pixel(m.x as usize, m.y as usize));
            assert!((0.0..=1.0).contains(&m.reliability));
            assert!(m.direction < crate::models::DIRECTION_BINS);
        }
        assert_eq!(d.stats.detected, d.minutiae.len());
    }

    #[test]
    fn test_cap_truncates() {
        let singularities: Vec<_> = (0..4)
            .flat_map(|i| (0..4).map(move |j| Singularity::new(40.0 + 40.0 * i as f32, 40.0 + 40.0 * j as f32, 1.0)))
            .collect();
        let data = synthetic_print(200, 200, 9.0, &singularities);
        let img = GrayscaleImage::new(&data, 200, 200, 500).unwrap();
        let full = detect(&img, &DetectConfig::default());
        let cfg = DetectConfig {
            max_minutiae: 3,
            ..DetectConfig::default()
        };
        let capped = detect(&img, &cfg);
        assert_eq!(capped.minutiae.len(), full.minutiae.len().min(3));
        assert_eq!(capped.stats.truncated, full.minutiae.len().saturating_sub(3));
    }
}
