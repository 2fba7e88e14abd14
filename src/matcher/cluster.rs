/// Greedy growth of mutually consistent correspondence clusters
use super::XytPoint;
use super::associations::Association;
use super::pairs::{bearing, distance};
use crate::config::MatchConfig;
use crate::utils::angles::{angle_difference, normalize_degrees};

/// Largest cluster found and what it cost to find it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ClusterSearch {
    /// (probe index, gallery index) members of the best cluster
    pub members: Vec<(u16, u16)>,
    /// Seeds grown
    pub seeds: usize,
    /// Consistency checks performed
    pub checks: u64,
    /// The budget ran out before every seed was grown
    pub exhausted: bool,
}

struct Grower<'a> {
    probe: &'a [XytPoint],
    gallery: &'a [XytPoint],
    cfg: &'a MatchConfig,
    checks: u64,
}

impl Grower<'_> {
    /// (p, g) agrees with member (pm, gm) under rotation `r`.
    fn consistent(&mut self, p: u16, g: u16, pm: u16, gm: u16, r: i32) -> bool {
        self.checks += 1;
        let (a, b) = (&self.probe[pm as usize], &self.probe[p as usize]);
        let (c, d) = (&self.gallery[gm as usize], &self.gallery[g as usize]);
        let dp = distance(a, b);
        let dg = distance(c, d);
        if (dp - dg).abs() > self.cfg.distance_tolerance_for(dp, dg) {
            return false;
        }
        // Bearings of very short segments are too noisy to compare.
        if dp <= self.cfg.min_pair_distance {
            return true;
        }
        angle_difference(normalize_degrees(bearing(a, b) + r), bearing(c, d)) <= self.cfg.angle_tolerance
    }

    /// Point directions of (p, g) agree with rotation `r`.
    fn direction_agrees(&self, p: u16, g: u16, r: i32) -> bool {
        let turn = self.gallery[g as usize].direction - self.probe[p as usize].direction;
        angle_difference(normalize_degrees(turn), r) <= self.cfg.rotation_tolerance
    }

    fn over_budget(&self) -> bool {
        self.checks >= self.cfg.budget
    }
}

/// Grow a cluster from each seed and keep the largest.
///
/// `strength` is row-major by probe index, as
/// [`correspondence_strength`](super::associations::correspondence_strength) builds it.
pub(crate) fn best_cluster(
    probe: &[XytPoint],
    gallery: &[XytPoint],
    assocs: &[Association],
    strength: &[u32],
    cfg: &MatchConfig,
) -> ClusterSearch {
    let glen = gallery.len();
    let s = |p: u16, g: u16| strength[p as usize * glen + g as usize];

    // Seeds: strongest combined support first, then index order
    let mut order: Vec<usize> = (0..assocs.len()).collect();
    order.sort_by(|&x, &y| {
        let (a, b) = (&assocs[x], &assocs[y]);
        let sa = s(a.p1, a.g1) + s(a.p2, a.g2);
        let sb = s(b.p1, b.g1) + s(b.p2, b.g2);
        sb.cmp(&sa)
            .then((a.p1, a.p2, a.g1, a.g2).cmp(&(b.p1, b.p2, b.g1, b.g2)))
    });

    // Associations bucketed by rotation for candidate lookup
    let mut by_rotation: Vec<Vec<usize>> = vec![Vec::new(); 360];
    for (k, a) in assocs.iter().enumerate() {
        by_rotation[a.rotation as usize].push(k);
    }

    let mut grower = Grower {
        probe,
        gallery,
        cfg,
        checks: 0,
    };
    let mut result = ClusterSearch::default();
    let mut seen = vec![false; probe.len() * glen];
    let mut used_p = vec![false; probe.len()];
    let mut used_g = vec![false; glen];

    for &seed_idx in order.iter().take(cfg.max_seeds) {
        if grower.over_budget() {
            result.exhausted = true;
            break;
        }
        let seed = assocs[seed_idx];
        let r0 = seed.rotation;
        result.seeds += 1;

        // Candidate correspondences from rotation-compatible associations
        let mut candidates: Vec<(u32, u16, u16)> = Vec::new();
        for dr in -cfg.rotation_tolerance..=cfg.rotation_tolerance {
            for &k in &by_rotation[normalize_degrees(r0 + dr) as usize] {
                let a = &assocs[k];
                for (p, g) in [(a.p1, a.g1), (a.p2, a.g2)] {
                    let slot = p as usize * glen + g as usize;
                    if !seen[slot] {
                        seen[slot] = true;
                        candidates.push((s(p, g), p, g));
                    }
                }
            }
        }
        for &(_, p, g) in &candidates {
            seen[p as usize * glen + g as usize] = false;
        }
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        let mut members = vec![(seed.p1, seed.g1), (seed.p2, seed.g2)];
        used_p[seed.p1 as usize] = true;
        used_p[seed.p2 as usize] = true;
        used_g[seed.g1 as usize] = true;
        used_g[seed.g2 as usize] = true;

        for &(_, p, g) in &candidates {
            if used_p[p as usize] || used_g[g as usize] || !grower.direction_agrees(p, g, r0) {
                continue;
            }
            let mut ok = true;
            for &(pm, gm) in &members {
                if !grower.consistent(p, g, pm, gm, r0) {
                    ok = false;
                    break;
                }
            }
            if ok {
                members.push((p, g));
                used_p[p as usize] = true;
                used_g[g as usize] = true;
            }
            if grower.over_budget() {
                result.exhausted = true;
                break;
            }
        }

        for &(p, g) in &members {
            used_p[p as usize] = false;
            used_g[g as usize] = false;
        }
        if members.len() > result.members.len() {
            result.members = members;
        }
        if result.exhausted {
            break;
        }
    }

    result.checks = grower.checks;
    result
}
