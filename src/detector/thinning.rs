/// Zhang–Suen thinning of a 0/1 ridge mask down to one-pixel-wide ridges
///
/// Neighbours are numbered P2..P9 clockwise from north, the usual convention.

/// Offsets of P2..P9 clockwise from north
pub(crate) const NEIGHBOURS: [(isize, isize); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

#[inline]
fn pixel(mask: &[u8], width: usize, height: usize, x: isize, y: isize) -> u8 {
    if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
        0
    } else {
        mask[y as usize * width + x as usize]
    }
}

/// P2..P9 around (x, y); out of bounds reads as background.
#[inline]
pub(crate) fn ring(mask: &[u8], width: usize, height: usize, x: usize, y: usize) -> [u8; 8] {
    let (xi, yi) = (x as isize, y as isize);
    let mut p = [0u8; 8];
    for (slot, &(dx, dy)) in p.iter_mut().zip(NEIGHBOURS.iter()) {
        *slot = pixel(mask, width, height, xi + dx, yi + dy);
    }
    p
}

/// Thin `mask` in place; returns the number of passes taken.
pub(crate) fn zhang_suen(mask: &mut [u8], width: usize, height: usize) -> usize {
    let mut passes = 0;
    let mut marked: Vec<usize> = Vec::new();
    loop {
        let mut changed = false;
        for step in 0..2 {
            marked.clear();
            for y in 0..height {
                for x in 0..width {
                    let idx = y * width + x;
                    if mask[idx] == 0 {
                        continue;
                    }
                    let p = ring(mask, width, height, x, y);
                    let b: u8 = p.iter().sum();
                    if !(2..=6).contains(&b) {
                        continue;
                    }
                    let a = (0..8).filter(|&i| p[i] == 0 && p[(i + 1) % 8] == 1).count();
                    if a != 1 {
                        continue;
                    }
                    // p[0]=P2, p[2]=P4, p[4]=P6, p[6]=P8
                    let (c1, c2) = if step == 0 {
                        (p[0] * p[2] * p[4], p[2] * p[4] * p[6])
                    } else {
                        (p[0] * p[2] * p[6], p[0] * p[4] * p[6])
                    };
                    if c1 == 0 && c2 == 0 {
                        marked.push(idx);
                    }
                }
            }
            if !marked.is_empty() {
                changed = true;
                for &idx in &marked {
                    mask[idx] = 0;
                }
            }
        }
        passes += 1;
        if !changed {
            break;
        }
    }
    passes
}
