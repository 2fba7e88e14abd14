/// Intra-set pair tables
///
/// Every ordered pair of minutiae within the distance window, discretized to
/// whole pixels and whole degrees.
use super::XytPoint;
use crate::config::MatchConfig;
use crate::utils::angles::{normalize_degrees, to_degrees_bin};

/// Relation from minutia `i` to minutia `j`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pair {
    pub i: u16,
    pub j: u16,
    /// Rounded Euclidean distance in pixels
    pub distance: i32,
    /// Direction of the segment i→j, degrees
    pub bearing: i32,
    /// Direction of `i` relative to the bearing
    pub beta_i: i32,
    /// Direction of `j` relative to the bearing
    pub beta_j: i32,
}

/// Pixel distance between two points
#[inline]
pub(crate) fn distance(a: &XytPoint, b: &XytPoint) -> f32 {
    let dx = (b.x - a.x) as f32;
    let dy = (b.y - a.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Bearing from `a` to `b` in whole degrees
#[inline]
pub(crate) fn bearing(a: &XytPoint, b: &XytPoint) -> i32 {
    to_degrees_bin(((b.y - a.y) as f32).atan2((b.x - a.x) as f32))
}

/// Ordered pairs within the window, sorted by distance then `(i, j)`.
pub(crate) fn pair_table(points: &[XytPoint], cfg: &MatchConfig) -> Vec<Pair> {
    let mut pairs = Vec::new();
    for (i, a) in points.iter().enumerate() {
        for (j, b) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            let d = distance(a, b);
            if d < cfg.min_pair_distance || d > cfg.max_pair_distance {
                continue;
            }
            let theta = bearing(a, b);
            pairs.push(Pair {
                i: i as u16,
                j: j as u16,
                distance: d.round() as i32,
                bearing: theta,
                beta_i: normalize_degrees(a.direction - theta),
                beta_j: normalize_degrees(b.direction - theta),
            });
        }
    }
    pairs.sort_by_key(|p| (p.distance, p.i, p.j));
    pairs
}
