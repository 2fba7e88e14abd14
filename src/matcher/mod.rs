//! Minutiae-set matching by geometric-consistency clustering
//!
//! Both sets are reduced to pair tables, pairs are associated across the
//! sets, and the largest cluster of mutually consistent point
//! correspondences is grown greedily from the best-supported associations.
//!
//! The first argument is always the probe. Seeds and candidate order are
//! taken from the probe side, so swapping the arguments can change the
//! score; callers that compare scores should keep one convention.

pub(crate) mod associations;
pub(crate) mod cluster;
pub(crate) mod pairs;

use log::{debug, trace, warn};

use crate::config::MatchConfig;
use crate::error::Result;
use crate::models::minutia::keep_most_reliable;
use crate::models::{MatchResult, MinutiaRecord, MinutiaSet};

/// Integer (x, y, direction) triple the matcher works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct XytPoint {
    pub x: i32,
    pub y: i32,
    /// Degrees in `[0, 360)`
    pub direction: i32,
}

impl From<&MinutiaRecord> for XytPoint {
    fn from(r: &MinutiaRecord) -> Self {
        Self {
            x: r.x,
            y: r.y,
            direction: r.direction,
        }
    }
}

/// Score for a cluster of `n` correspondences: the number of consistent pairs in it.
#[inline]
pub fn cluster_score(n: usize) -> u32 {
    if n < 2 { 0 } else { (n * (n - 1) / 2) as u32 }
}

/// Compare two detected sets, `probe` first.
pub fn match_sets(probe: &MinutiaSet, gallery: &MinutiaSet, cfg: &MatchConfig) -> MatchResult {
    let to_points = |set: &MinutiaSet| -> Vec<XytPoint> {
        keep_most_reliable(set.as_slice().to_vec(), cfg.max_minutiae, |m| m.reliability)
            .iter()
            .map(|m| XytPoint {
                x: m.x as i32,
                y: m.y as i32,
                direction: i32::from(m.direction),
            })
            .collect()
    };
    match_points(&to_points(probe), &to_points(gallery), cfg)
}

/// Compare two record lists, `probe` first.
///
/// Malformed records are rejected; lists longer than the cap are truncated
/// to their most reliable entries.
pub fn match_records(probe: &[MinutiaRecord], gallery: &[MinutiaRecord], cfg: &MatchConfig) -> Result<MatchResult> {
    let prepare = |records: &[MinutiaRecord]| -> Result<Vec<XytPoint>> {
        for (i, r) in records.iter().enumerate() {
            r.validate(i)?;
        }
        Ok(
            keep_most_reliable(records.to_vec(), cfg.max_minutiae, MinutiaRecord::reliability_or_default)
                .iter()
                .map(XytPoint::from)
                .collect(),
        )
    };
    let probe = prepare(probe)?;
    let gallery = prepare(gallery)?;
    Ok(match_points(&probe, &gallery, cfg))
}

/// Score two point lists already truncated to the cap.
pub(crate) fn match_points(probe: &[XytPoint], gallery: &[XytPoint], cfg: &MatchConfig) -> MatchResult {
    let mut result = MatchResult {
        score: 0,
        probe_count: probe.len(),
        gallery_count: gallery.len(),
    };
    let floor = cfg.min_computable_minutiae.max(2);
    if probe.len() < floor || gallery.len() < floor {
        trace!("match: too few minutiae ({} vs {})", probe.len(), gallery.len());
        return result;
    }

    let probe_pairs = pairs::pair_table(probe, cfg);
    let gallery_pairs = pairs::pair_table(gallery, cfg);
    let assocs = associations::associate(&probe_pairs, &gallery_pairs, cfg);
    if assocs.is_empty() {
        debug!(
            "match: {} probe pairs, {} gallery pairs, no associations",
            probe_pairs.len(),
            gallery_pairs.len()
        );
        return result;
    }

    let strength = associations::correspondence_strength(&assocs, probe.len(), gallery.len());
    let found = cluster::best_cluster(probe, gallery, &assocs, &strength, cfg);
    if found.exhausted {
        warn!(
            "match: budget of {} checks exhausted after {} seeds, keeping best cluster of {}",
            cfg.budget,
            found.seeds,
            found.members.len()
        );
    }
    result.score = cluster_score(found.members.len());
    debug!(
        "match: {} probe pairs, {} gallery pairs, {} associations, {} seeds, {} checks, cluster {} -> score {}",
        probe_pairs.len(),
        gallery_pairs.len(),
        assocs.len(),
        found.seeds,
        found.checks,
        found.members.len(),
        result.score
    );
    result
}
