/// False-minutia removal
///
/// Every structural filter looks at the original candidate list so the
/// outcome does not depend on the order filters run in; a candidate is
/// credited to the first filter that flags it.
use super::skeleton::{Trace, TraceStop};
use crate::models::MinutiaKind;
use crate::utils::angles::{angle_difference, to_degrees_bin};

/// Degrees within which two endings count as facing each other.
const FACING_TOLERANCE: i32 = 45;

/// Filter that removed a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removal {
    Spur,
    ShortRidge,
    Bridge,
    BrokenRidge,
    Duplicate,
}

/// Candidate with its direction and branch traces
#[derive(Debug, Clone)]
pub(crate) struct Traced {
    pub x: usize,
    pub y: usize,
    pub kind: MinutiaKind,
    /// Degrees in `[0, 360)`
    pub direction: i32,
    /// One trace for an ending, three for a bifurcation
    pub traces: Vec<Trace>,
    pub removed: Option<Removal>,
}

impl Traced {
    fn mark(&mut self, why: Removal) {
        if self.removed.is_none() {
            self.removed = Some(why);
        }
    }

    #[inline]
    fn distance(&self, other: &Traced) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dy = self.y as f32 - other.y as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whole degrees from self toward `other`
    #[inline]
    fn bearing_to(&self, other: &Traced) -> i32 {
        let dy = other.y as f32 - self.y as f32;
        let dx = other.x as f32 - self.x as f32;
        to_degrees_bin(dy.atan2(dx))
    }
}

/// Lookup from pixel position to candidate index
pub(crate) struct PositionIndex {
    width: usize,
    height: usize,
    /// index + 1, 0 for none
    slots: Vec<u32>,
}

impl PositionIndex {
    pub(crate) fn new(width: usize, height: usize, items: &[Traced]) -> Self {
        let mut slots = vec![0u32; width * height];
        for (i, t) in items.iter().enumerate() {
            slots[t.y * width + t.x] = i as u32 + 1;
        }
        Self {
            width,
            height,
            slots,
        }
    }

    /// First candidate of `kind` within one pixel of (x, y), scanning in raster order.
    fn near(&self, items: &[Traced], x: usize, y: usize, kind: MinutiaKind) -> Option<usize> {
        for ny in y.saturating_sub(1)..=(y + 1).min(self.height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(self.width - 1) {
                let slot = self.slots[ny * self.width + nx];
                if slot == 0 {
                    continue;
                }
                let i = slot as usize - 1;
                if items[i].kind == kind {
                    return Some(i);
                }
            }
        }
        None
    }
}

/// Spurs, short ridges and bridges: branches that meet another feature within `max_len` steps.
pub(crate) fn remove_short_structures(items: &mut [Traced], index: &PositionIndex, max_len: usize) {
    let mut marks: Vec<(usize, Removal)> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        for trace in item.traces.iter().filter(|t| t.steps <= max_len) {
            let (why, other_kind) = match (item.kind, trace.stop) {
                (MinutiaKind::RidgeEnding, TraceStop::Junction) => (Removal::Spur, MinutiaKind::Bifurcation),
                (MinutiaKind::RidgeEnding, TraceStop::Ending) => (Removal::ShortRidge, MinutiaKind::RidgeEnding),
                (MinutiaKind::Bifurcation, TraceStop::Junction) => (Removal::Bridge, MinutiaKind::Bifurcation),
                (MinutiaKind::Bifurcation, TraceStop::Ending) => (Removal::Spur, MinutiaKind::RidgeEnding),
                (_, TraceStop::Limit) => continue,
            };
            marks.push((i, why));
            if let Some(j) = index.near(items, trace.x, trace.y, other_kind) {
                if j != i {
                    marks.push((j, why));
                }
            }
        }
    }
    for (i, why) in marks {
        items[i].mark(why);
    }
}

/// Pairs of endings facing each other across a small gap.
///
/// Each ending must point along the bearing to the other, and the two
/// directions must be roughly opposite.
pub(crate) fn remove_broken_ridges(items: &mut [Traced], max_gap: f32) {
    let endings: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind == MinutiaKind::RidgeEnding)
        .map(|(i, _)| i)
        .collect();
    let mut marks = Vec::new();
    for (a, &i) in endings.iter().enumerate() {
        for &j in &endings[a + 1..] {
            let (p, q) = (&items[i], &items[j]);
            if p.distance(q) >= max_gap {
                continue;
            }
            let toward_q = p.bearing_to(q);
            let opposed = (angle_difference(p.direction, q.direction) - 180).abs() < FACING_TOLERANCE;
            let facing = angle_difference(p.direction, toward_q) < FACING_TOLERANCE
                && angle_difference(q.direction, toward_q + 180) < FACING_TOLERANCE;
            if opposed && facing {
                marks.push(i);
                marks.push(j);
            }
        }
    }
    for i in marks {
        items[i].mark(Removal::BrokenRidge);
    }
}

/// Survivors closer than `min_separation` to an earlier survivor.
pub(crate) fn remove_duplicates(items: &mut [Traced], min_separation: f32) {
    let mut kept: Vec<usize> = Vec::new();
    for i in 0..items.len() {
        if items[i].removed.is_some() {
            continue;
        }
        if kept.iter().any(|&k| items[k].distance(&items[i]) < min_separation) {
            items[i].mark(Removal::Duplicate);
        } else {
            kept.push(i);
        }
    }
}
