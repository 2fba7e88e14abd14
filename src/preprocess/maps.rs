use std::f32::consts::PI;

use super::blocks::{BlockGrid, PixelRect};
use super::orientation::BlockFlow;
use crate::config::DetectConfig;

/// Quantized ridge directions over 180°
pub const DIRECTION_COUNT: usize = 16;

/// Block-resolution ridge flow, contrast and validity
///
/// Every per-block vector is indexed by [`BlockGrid::index`].
#[derive(Debug, Clone)]
pub struct RidgeMaps {
    grid: BlockGrid,
    direction: Vec<i32>,
    orientation: Vec<f32>,
    low_contrast: Vec<bool>,
    low_flow: Vec<bool>,
    high_curvature: Vec<bool>,
    contrast: Vec<f32>,
    coherence: Vec<f32>,
    distance_to_invalid: Vec<u16>,
}

impl RidgeMaps {
    pub(crate) fn build(
        grid: BlockGrid,
        flow: &[BlockFlow],
        orientation: Vec<f32>,
        curvature: &[f32],
        valid: &[bool],
        cfg: &DetectConfig,
    ) -> Self {
        let low_contrast: Vec<bool> = flow
            .iter()
            .map(|f| f.contrast < cfg.min_block_contrast)
            .collect();
        let low_flow: Vec<bool> = flow
            .iter()
            .map(|f| f.coherence < cfg.min_block_coherence)
            .collect();
        let direction = orientation
            .iter()
            .zip(valid)
            .map(|(&theta, &ok)| if ok { quantize(theta) } else { -1 })
            .collect();
        let high_curvature = curvature
            .iter()
            .zip(valid)
            .map(|(&c, &ok)| ok && c > cfg.high_curvature_threshold)
            .collect();

        Self {
            distance_to_invalid: distance_to_invalid(&grid, valid),
            grid,
            direction,
            orientation,
            low_contrast,
            low_flow,
            high_curvature,
            contrast: flow.iter().map(|f| f.contrast).collect(),
            coherence: flow.iter().map(|f| f.coherence).collect(),
        }
    }

    /// Block partition the maps are laid out on
    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    /// Quantized direction per block in `0..DIRECTION_COUNT`, `-1` where invalid
    pub fn direction_map(&self) -> &[i32] {
        &self.direction
    }

    /// Low-contrast flag per block
    pub fn low_contrast_map(&self) -> &[bool] {
        &self.low_contrast
    }

    /// Low-flow flag per block
    pub fn low_flow_map(&self) -> &[bool] {
        &self.low_flow
    }

    /// High-curvature flag per block
    pub fn high_curvature_map(&self) -> &[bool] {
        &self.high_curvature
    }

    /// Block passed both the contrast and the flow checks.
    #[inline]
    pub fn is_valid(&self, idx: usize) -> bool {
        self.direction[idx] >= 0
    }

    /// Validity of the block containing pixel (x, y)
    #[inline]
    pub fn is_valid_pixel(&self, x: usize, y: usize) -> bool {
        self.is_valid(self.grid.index_of_pixel(x, y))
    }

    /// Quantized direction of a valid block
    #[inline]
    pub fn direction_index(&self, idx: usize) -> Option<usize> {
        usize::try_from(self.direction[idx]).ok()
    }

    /// Smoothed ridge axis in `[0, π)`
    #[inline]
    pub fn orientation(&self, idx: usize) -> f32 {
        self.orientation[idx]
    }

    /// Intensity standard deviation of a block
    #[inline]
    pub fn contrast(&self, idx: usize) -> f32 {
        self.contrast[idx]
    }

    /// Orientation coherence of a block
    #[inline]
    pub fn coherence(&self, idx: usize) -> f32 {
        self.coherence[idx]
    }

    /// High-curvature flag of a block
    #[inline]
    pub fn is_high_curvature(&self, idx: usize) -> bool {
        self.high_curvature[idx]
    }

    /// Blocks to the nearest invalid block or grid edge (1 = touching).
    #[inline]
    pub fn distance_to_invalid(&self, idx: usize) -> u16 {
        self.distance_to_invalid[idx]
    }

    /// Number of valid blocks
    pub fn valid_blocks(&self) -> usize {
        self.direction.iter().filter(|&&d| d >= 0).count()
    }

    /// True when no block is valid
    pub fn is_empty(&self) -> bool {
        self.valid_blocks() == 0
    }

    /// Bounding box of the valid blocks, if any
    pub fn foreground_bounds(&self) -> Option<PixelRect> {
        let mut bounds: Option<PixelRect> = None;
        for by in 0..self.grid.rows() {
            for bx in 0..self.grid.cols() {
                if !self.is_valid(self.grid.index(bx, by)) {
                    continue;
                }
                let r = self.grid.rect(bx, by);
                bounds = Some(match bounds {
                    None => r,
                    Some(b) => PixelRect {
                        x0: b.x0.min(r.x0),
                        y0: b.y0.min(r.y0),
                        x1: b.x1.max(r.x1),
                        y1: b.y1.max(r.y1),
                    },
                });
            }
        }
        bounds
    }

    /// Block quality level, 0 (invalid) to 4 (clean, well inside the print).
    pub fn quality_level(&self, idx: usize) -> u8 {
        if !self.is_valid(idx) {
            0
        } else if self.distance_to_invalid[idx] <= 1 {
            1
        } else if self.high_curvature[idx] || self.coherence[idx] < 0.5 {
            2
        } else if self.coherence[idx] < 0.7 {
            3
        } else {
            4
        }
    }
}

/// Quantize a ridge axis onto `DIRECTION_COUNT` bins over 180°.
pub(crate) fn quantize(theta: f32) -> i32 {
    let step = PI / DIRECTION_COUNT as f32;
    ((theta / step).round() as i32).rem_euclid(DIRECTION_COUNT as i32)
}

/// Chessboard distance transform over the block grid.
///
/// Invalid blocks are distance 0; the grid edge also bounds the distance.
fn distance_to_invalid(grid: &BlockGrid, valid: &[bool]) -> Vec<u16> {
    let (cols, rows) = (grid.cols(), grid.rows());
    let far = u16::MAX / 2;
    let mut d: Vec<u16> = valid.iter().map(|&ok| if ok { far } else { 0 }).collect();

    for by in 0..rows {
        for bx in 0..cols {
            let idx = grid.index(bx, by);
            let mut best = d[idx];
            if bx > 0 {
                best = best.min(d[idx - 1] + 1);
            }
            if by > 0 {
                let up = idx - cols;
                best = best.min(d[up] + 1);
                if bx > 0 {
                    best = best.min(d[up - 1] + 1);
                }
                if bx + 1 < cols {
                    best = best.min(d[up + 1] + 1);
                }
            }
            d[idx] = best;
        }
    }
    for by in (0..rows).rev() {
        for bx in (0..cols).rev() {
            let idx = grid.index(bx, by);
            let mut best = d[idx];
            if bx + 1 < cols {
                best = best.min(d[idx + 1] + 1);
            }
            if by + 1 < rows {
                let down = idx + cols;
                best = best.min(d[down] + 1);
                if bx > 0 {
                    best = best.min(d[down - 1] + 1);
                }
                if bx + 1 < cols {
                    best = best.min(d[down + 1] + 1);
                }
            }
            d[idx] = best;
        }
    }

    d.iter()
        .enumerate()
        .map(|(idx, &v)| {
            let edge = grid.edge_distance(idx % cols, idx / cols) as u16;
            v.min(edge)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(PI / 2.0), 8);
        // Just below π wraps back to bin 0.
        assert_eq!(quantize(PI - 0.01), 0);
    }

    #[test]
    fn test_distance_transform() {
        let grid = BlockGrid::new(60, 60, 12);
        let mut valid = vec![true; grid.len()];
        valid[grid.index(0, 0)] = false;
        let d = distance_to_invalid(&grid, &valid);
        assert_eq!(d[grid.index(0, 0)], 0);
        assert_eq!(d[grid.index(1, 1)], 1);
        // Two blocks from the invalid corner, three from the edge.
        assert_eq!(d[grid.index(2, 2)], 2);
    }

    #[test]
    fn test_all_valid_distance_is_edge_bound() {
        let grid = BlockGrid::new(84, 84, 12);
        let valid = vec![true; grid.len()];
        let d = distance_to_invalid(&grid, &valid);
        assert_eq!(d[grid.index(3, 3)], 4);
        assert_eq!(d[grid.index(0, 3)], 1);
    }
}
