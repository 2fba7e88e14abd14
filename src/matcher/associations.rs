/// Inter-set pair associations
///
/// An unordered probe pair is associated with an ordered gallery pair when
/// their distances agree within tolerance and both relative angles agree.
/// Each association proposes two correspondences and one rotation.
use super::pairs::Pair;
use crate::config::MatchConfig;
use crate::utils::angles::{angle_difference, normalize_degrees};

/// Probe pair (p1, p2) matched to gallery pair (g1, g2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Association {
    pub p1: u16,
    pub p2: u16,
    pub g1: u16,
    pub g2: u16,
    /// Gallery bearing minus probe bearing, degrees
    pub rotation: i32,
}

/// All associations in probe-pair order, then gallery-pair order.
///
/// `gallery` must be sorted by distance, as [`pair_table`](super::pairs::pair_table) returns it.
pub(crate) fn associate(probe: &[Pair], gallery: &[Pair], cfg: &MatchConfig) -> Vec<Association> {
    let mut out = Vec::new();
    for p in probe.iter().filter(|p| p.i < p.j) {
        let d = p.distance as f32;
        // Widest tolerance any partner distance near `d` could get
        let reach = cfg.distance_tolerance_for(d, d) * 1.1 + 1.0;
        let lo = gallery.partition_point(|g| (g.distance as f32) < d - reach);
        for g in gallery[lo..].iter().take_while(|g| g.distance as f32 <= d + reach) {
            let gd = g.distance as f32;
            if (gd - d).abs() > cfg.distance_tolerance_for(d, gd) {
                continue;
            }
            if angle_difference(p.beta_i, g.beta_i) > cfg.angle_tolerance
                || angle_difference(p.beta_j, g.beta_j) > cfg.angle_tolerance
            {
                continue;
            }
            out.push(Association {
                p1: p.i,
                p2: p.j,
                g1: g.i,
                g2: g.j,
                rotation: normalize_degrees(g.bearing - p.bearing),
            });
        }
    }
    out
}

/// Supporting-association count per (probe, gallery) correspondence, row-major by probe.
pub(crate) fn correspondence_strength(assocs: &[Association], probe_len: usize, gallery_len: usize) -> Vec<u32> {
    let mut strength = vec![0u32; probe_len * gallery_len];
    for a in assocs {
        strength[a.p1 as usize * gallery_len + a.g1 as usize] += 1;
        strength[a.p2 as usize * gallery_len + a.g2 as usize] += 1;
    }
    strength
}

#[cfg(test)]
mod tests {
    use super::super::XytPoint;
    use super::super::pairs::pair_table;
    use super::*;

    fn pt(x: i32, y: i32, direction: i32) -> XytPoint {
        XytPoint { x, y, direction }
    }

    #[test]
    fn test_rotated_pair_associates() {
        let cfg = MatchConfig::default();
        let probe = pair_table(&[pt(0, 0, 0), pt(40, 0, 90)], &cfg);
        // Same pair rotated by 90°
        let gallery = pair_table(&[pt(100, 100, 90), pt(100, 140, 180)], &cfg);
        let assocs = associate(&probe, &gallery, &cfg);
        assert_eq!(assocs.len(), 1);
        let a = assocs[0];
        assert_eq!((a.p1, a.p2, a.g1, a.g2), (0, 1, 0, 1));
        assert_eq!(a.rotation, 90);
    }

    #[test]
    fn test_mismatched_angles_do_not_associate() {
        let cfg = MatchConfig::default();
        let probe = pair_table(&[pt(0, 0, 0), pt(40, 0, 90)], &cfg);
        let gallery = pair_table(&[pt(0, 0, 0), pt(40, 0, 200)], &cfg);
        assert!(associate(&probe, &gallery, &cfg).is_empty());
    }

    #[test]
    fn test_distance_tolerance_scales() {
        let cfg = MatchConfig::default();
        let probe = pair_table(&[pt(0, 0, 0), pt(100, 0, 0)], &cfg);
        // 5 px longer is inside 6% of 100
        let gallery = pair_table(&[pt(0, 0, 0), pt(105, 0, 0)], &cfg);
        assert_eq!(associate(&probe, &gallery, &cfg).len(), 1);
        let gallery = pair_table(&[pt(0, 0, 0), pt(109, 0, 0)], &cfg);
        assert!(associate(&probe, &gallery, &cfg).is_empty());
    }

    #[test]
    fn test_strength_counts_support() {
        let assocs = [
            Association { p1: 0, p2: 1, g1: 0, g2: 1, rotation: 0 },
            Association { p1: 0, p2: 2, g1: 0, g2: 2, rotation: 0 },
        ];
        let s = correspondence_strength(&assocs, 3, 3);
        assert_eq!(s[0], 2);
        assert_eq!(s[3 + 1], 1);
        assert_eq!(s[2 * 3 + 2], 1);
    }
}
