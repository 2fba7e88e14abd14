/// Minutia candidates and ridge tracing on a thinned ridge mask
use super::thinning::{NEIGHBOURS, ring};
use crate::models::MinutiaKind;

/// One-pixel-wide ridge skeleton, 1 = ridge
pub(crate) struct Skeleton {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

/// Why a trace stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TraceStop {
    /// Walked the full length without meeting anything
    Limit,
    /// Reached a ridge end
    Ending,
    /// Reached a junction
    Junction,
}

/// Result of following one ridge branch
#[derive(Debug, Clone, Copy)]
pub(crate) struct Trace {
    pub x: usize,
    pub y: usize,
    pub steps: usize,
    pub stop: TraceStop,
}

/// Skeleton pixel whose neighbourhood marks it as an ending or a bifurcation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub x: usize,
    pub y: usize,
    pub kind: MinutiaKind,
}

impl Skeleton {
    pub(crate) fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub(crate) fn is_ridge(&self, x: isize, y: isize) -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && self.data[y as usize * self.width + x as usize] == 1
    }

    /// Number of ridge/background transitions around (x, y), halved
    pub(crate) fn crossing_number(&self, x: usize, y: usize) -> u8 {
        let p = ring(&self.data, self.width, self.height, x, y);
        let changes: u8 = (0..8).map(|i| p[i].abs_diff(p[(i + 1) % 8])).sum();
        changes / 2
    }

    /// Endings (crossing number 1) and bifurcations (3) in raster order.
    ///
    /// `accept` decides whether a pixel position may hold a minutia.
    pub(crate) fn candidates(&self, accept: impl Fn(usize, usize) -> bool) -> Vec<Candidate> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.data[y * self.width + x] == 0 || !accept(x, y) {
                    continue;
                }
                let kind = match self.crossing_number(x, y) {
                    1 => MinutiaKind::RidgeEnding,
                    3 => MinutiaKind::Bifurcation,
                    _ => continue,
                };
                out.push(Candidate { x, y, kind });
            }
        }
        out
    }

    /// First pixel of each ridge branch leaving (x, y).
    ///
    /// Each run of consecutive ridge neighbours is one branch; orthogonal
    /// neighbours are preferred as the run's representative.
    pub(crate) fn branch_starts(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let (xi, yi) = (x as isize, y as isize);
        let on: Vec<bool> = NEIGHBOURS
            .iter()
            .map(|&(dx, dy)| self.is_ridge(xi + dx, yi + dy))
            .collect();
        // A fully surrounded pixel has no branch boundary to start from.
        let Some(first_off) = on.iter().position(|&v| !v) else {
            return Vec::new();
        };

        let mut starts = Vec::new();
        let mut run: Vec<usize> = Vec::new();
        for k in 1..=8 {
            let i = (first_off + k) % 8;
            if on[i] {
                run.push(i);
            }
            if (!on[i] || k == 8) && !run.is_empty() {
                // Even ring slots are the orthogonal neighbours.
                let pick = run.iter().copied().find(|i| i % 2 == 0).unwrap_or(run[0]);
                let (dx, dy) = NEIGHBOURS[pick];
                starts.push(((xi + dx) as usize, (yi + dy) as usize));
                run.clear();
            }
        }
        starts
    }

    /// Follow the ridge from `origin` through `start` for at most `limit` steps.
    pub(crate) fn trace(&self, origin: (usize, usize), start: (usize, usize), limit: usize) -> Trace {
        // Pixels around the origin belong to other branches; never step there.
        let mut visited: Vec<(usize, usize)> = vec![origin];
        let (ox, oy) = (origin.0 as isize, origin.1 as isize);
        for &(dx, dy) in &NEIGHBOURS {
            if self.is_ridge(ox + dx, oy + dy) {
                visited.push(((ox + dx) as usize, (oy + dy) as usize));
            }
        }

        let mut current = start;
        let mut steps = 1;
        loop {
            match self.crossing_number(current.0, current.1) {
                1 => return self.stop(current, steps, TraceStop::Ending),
                n if n >= 3 => return self.stop(current, steps, TraceStop::Junction),
                _ => {}
            }
            if steps >= limit {
                return self.stop(current, steps, TraceStop::Limit);
            }

            let (cx, cy) = (current.0 as isize, current.1 as isize);
            let mut next: Option<(usize, usize)> = None;
            // Orthogonal first, so staircase corners are walked rather than cut.
            for pass in 0..2 {
                for (i, &(dx, dy)) in NEIGHBOURS.iter().enumerate() {
                    if i % 2 != pass || !self.is_ridge(cx + dx, cy + dy) {
                        continue;
                    }
                    let p = ((cx + dx) as usize, (cy + dy) as usize);
                    if !visited.contains(&p) && p != current {
                        next = Some(p);
                        break;
                    }
                }
                if next.is_some() {
                    break;
                }
            }

            visited.push(current);
            match next {
                Some(p) => {
                    current = p;
                    steps += 1;
                }
                None => return self.stop(current, steps, TraceStop::Ending),
            }
        }
    }

    fn stop(&self, at: (usize, usize), steps: usize, stop: TraceStop) -> Trace {
        Trace {
            x: at.0,
            y: at.1,
            steps,
            stop,
        }
    }
}
