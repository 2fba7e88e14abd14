/// Connected components over a 0/1 ridge mask
/// Used to drop ridge islands and fill valley holes too small to be real ridge structure

/// Union-Find data structure
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Root of `x`, halving the path on the way up.
    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grand = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        // Smaller root wins so labels stay stable regardless of merge order.
        if root_x < root_y {
            self.parent[root_y as usize] = root_x;
        } else if root_y < root_x {
            self.parent[root_x as usize] = root_y;
        }
    }
}

/// Flip every component of `target` pixels smaller than `min_area`.
///
/// `diagonal` selects 8-connectivity; 4-connectivity otherwise. Returns the
/// number of components flipped.
pub(crate) fn remove_small_components(
    mask: &mut [u8],
    width: usize,
    height: usize,
    target: u8,
    min_area: usize,
    diagonal: bool,
) -> usize {
    if min_area <= 1 || width == 0 || height == 0 {
        return 0;
    }
    let mut labels = vec![0u32; width * height];
    let mut next_label = 1u32;
    // Label 0 is "unlabelled"; at most one label per pixel plus that.
    let mut uf = UnionFind::new(width * height + 1);

    // First pass: provisional labels
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if mask[idx] != target {
                continue;
            }

            let mut neighbor_labels = [0u32; 4];
            let mut count = 0;
            let mut push = |l: u32| {
                if l != 0 {
                    neighbor_labels[count] = l;
                    count += 1;
                }
            };
            if x > 0 && mask[idx - 1] == target {
                push(labels[idx - 1]);
            }
            if y > 0 && mask[idx - width] == target {
                push(labels[idx - width]);
            }
            if diagonal && y > 0 {
                if x > 0 && mask[idx - width - 1] == target {
                    push(labels[idx - width - 1]);
                }
                if x + 1 < width && mask[idx - width + 1] == target {
                    push(labels[idx - width + 1]);
                }
            }

            let found = &neighbor_labels[..count];
            match found.iter().min() {
                None => {
                    labels[idx] = next_label;
                    next_label += 1;
                }
                Some(&min_label) => {
                    labels[idx] = min_label;
                    for &l in found {
                        if l != min_label {
                            uf.union(min_label, l);
                        }
                    }
                }
            }
        }
    }

    // Component areas by root
    let mut area = vec![0usize; next_label as usize];
    for idx in 0..labels.len() {
        if labels[idx] != 0 {
            let root = uf.find(labels[idx]);
            labels[idx] = root;
            area[root as usize] += 1;
        }
    }

    let flipped = if target == 0 { 1 } else { 0 };
    for (px, &label) in mask.iter_mut().zip(&labels) {
        if label != 0 && area[label as usize] < min_area {
            *px = flipped;
        }
    }
    area.iter().filter(|&&a| a > 0 && a < min_area).count()
}
