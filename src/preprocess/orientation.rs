/// Block-level ridge flow estimation from gradient structure
///
/// Gradients come from a 3x3 Sobel operator. Each block accumulates the
/// structure tensor over a window twice its size; the dominant gradient axis
/// is perpendicular to the ridges.
use rayon::prelude::*;
use std::f32::consts::FRAC_PI_2;

use super::blocks::BlockGrid;
use crate::models::GrayscaleImage;
use crate::utils::angles::normalize_axis;

/// Tensor energy below which a window is treated as flat.
const MIN_ENERGY: f32 = 1e-3;

/// Per-pixel Sobel gradients
pub(crate) struct Gradients {
    pub gx: Vec<f32>,
    pub gy: Vec<f32>,
}

/// Raw flow statistics for one block
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BlockFlow {
    /// Ridge axis in `[0, π)`
    pub orientation: f32,
    /// Orientation coherence in `[0, 1]`
    pub coherence: f32,
    /// Intensity standard deviation inside the block
    pub contrast: f32,
    /// Mean intensity inside the block
    pub mean: f32,
}

/// Sobel gradients with edge-clamped sampling, rows in parallel
pub(crate) fn sobel(image: &GrayscaleImage) -> Gradients {
    let width = image.width();
    let height = image.height();
    let mut gx = vec![0.0f32; width * height];
    let mut gy = vec![0.0f32; width * height];

    gx.par_chunks_mut(width)
        .zip(gy.par_chunks_mut(width))
        .enumerate()
        .for_each(|(y, (row_x, row_y))| {
            let yi = y as isize;
            for x in 0..width {
                let xi = x as isize;
                let p = |dx: isize, dy: isize| image.get_clamped(xi + dx, yi + dy) as f32;
                row_x[x] = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
                row_y[x] = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
            }
        });

    Gradients { gx, gy }
}

/// Orientation, coherence and contrast for every block
pub(crate) fn block_flow(image: &GrayscaleImage, grid: &BlockGrid, grads: &Gradients) -> Vec<BlockFlow> {
    let width = image.width();
    let margin = grid.block_size() / 2;

    (0..grid.len())
        .into_par_iter()
        .map(|idx| {
            let bx = idx % grid.cols();
            let by = idx / grid.cols();

            let win = grid.window(bx, by, margin);
            let (mut gxx, mut gyy, mut gxy) = (0.0f64, 0.0f64, 0.0f64);
            for y in win.y0..win.y1 {
                let row = y * width;
                for x in win.x0..win.x1 {
                    let dx = grads.gx[row + x] as f64;
                    let dy = grads.gy[row + x] as f64;
                    gxx += dx * dx;
                    gyy += dy * dy;
                    gxy += dx * dy;
                }
            }

            let rect = grid.rect(bx, by);
            let (mut sum, mut sum_sq) = (0.0f64, 0.0f64);
            for y in rect.y0..rect.y1 {
                for x in rect.x0..rect.x1 {
                    let v = image.get(x, y) as f64;
                    sum += v;
                    sum_sq += v * v;
                }
            }
            let n = rect.area().max(1) as f64;
            let mean = sum / n;
            let variance = (sum_sq / n - mean * mean).max(0.0);

            let energy = gxx + gyy;
            let (orientation, coherence) = if energy / (win.area().max(1) as f64) < MIN_ENERGY as f64 {
                (0.0, 0.0)
            } else {
                let diff = gxx - gyy;
                let gradient_axis = 0.5 * (2.0 * gxy).atan2(diff);
                let coherence = ((diff * diff + 4.0 * gxy * gxy).sqrt() / energy).clamp(0.0, 1.0);
                (normalize_axis(gradient_axis as f32 + FRAC_PI_2), coherence as f32)
            };

            BlockFlow {
                orientation,
                coherence,
                contrast: variance.sqrt() as f32,
                mean: mean as f32,
            }
        })
        .collect()
}

/// Average doubled-angle vectors over each valid block's 3x3 valid neighbourhood.
///
/// Invalid blocks keep their raw orientation, so callers must not rely on it.
pub(crate) fn smooth_orientations(grid: &BlockGrid, flow: &[BlockFlow], valid: &[bool]) -> Vec<f32> {
    (0..grid.len())
        .map(|idx| {
            if !valid[idx] {
                return flow[idx].orientation;
            }
            let bx = idx % grid.cols();
            let by = idx / grid.cols();
            let (mut sx, mut sy) = (0.0f32, 0.0f32);
            for n in grid.neighbourhood(bx, by).filter(|&n| valid[n]) {
                let w = flow[n].coherence.max(0.05);
                let (s, c) = (2.0 * flow[n].orientation).sin_cos();
                sx += w * c;
                sy += w * s;
            }
            if sx.abs() < f32::EPSILON && sy.abs() < f32::EPSILON {
                flow[idx].orientation
            } else {
                normalize_axis(0.5 * sy.atan2(sx))
            }
        })
        .collect()
}

/// Circular variance of orientations in each valid block's 3x3 valid neighbourhood
///
/// 0 for a perfectly parallel neighbourhood, approaching 1 near cores and deltas.
pub(crate) fn curvature(grid: &BlockGrid, orientation: &[f32], valid: &[bool]) -> Vec<f32> {
    (0..grid.len())
        .map(|idx| {
            if !valid[idx] {
                return 0.0;
            }
            let bx = idx % grid.cols();
            let by = idx / grid.cols();
            let (mut sx, mut sy, mut count) = (0.0f32, 0.0f32, 0usize);
            for n in grid.neighbourhood(bx, by).filter(|&n| valid[n]) {
                let (s, c) = (2.0 * orientation[n]).sin_cos();
                sx += c;
                sy += s;
                count += 1;
            }
            if count < 2 {
                return 0.0;
            }
            let resultant = (sx * sx + sy * sy).sqrt() / count as f32;
            (1.0 - resultant).clamp(0.0, 1.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::angles::axis_difference;
    use std::f32::consts::PI;

    fn stripes(width: usize, height: usize, angle: f32, period: f32) -> Vec<u8> {
        // Ridges run along `angle`; intensity varies across them.
        let (s, c) = angle.sin_cos();
        let mut data = vec![0u8; width * height];
        for y in 0..height {
            for x in 0..width {
                let across = -(x as f32) * s + y as f32 * c;
                let v = 128.0 + 100.0 * (2.0 * PI * across / period).cos();
                data[y * width + x] = v.clamp(0.0, 255.0) as u8;
            }
        }
        data
    }

    #[test]
    fn test_vertical_ridges() {
        let data = stripes(64, 64, FRAC_PI_2, 8.0);
        let img = GrayscaleImage::new(&data, 64, 64, 500).unwrap();
        let grid = BlockGrid::new(64, 64, 16);
        let flow = block_flow(&img, &grid, &sobel(&img));
        let centre = flow[grid.index(1, 1)];
        assert!(axis_difference(centre.orientation, FRAC_PI_2) < 0.1);
        assert!(centre.coherence > 0.8);
        assert!(centre.contrast > 30.0);
    }

    #[test]
    fn test_diagonal_ridges() {
        let data = stripes(64, 64, PI / 4.0, 8.0);
        let img = GrayscaleImage::new(&data, 64, 64, 500).unwrap();
        let grid = BlockGrid::new(64, 64, 16);
        let flow = block_flow(&img, &grid, &sobel(&img));
        assert!(axis_difference(flow[grid.index(2, 2)].orientation, PI / 4.0) < 0.15);
    }

    #[test]
    fn test_flat_block_has_no_flow() {
        let data = vec![90u8; 32 * 32];
        let img = GrayscaleImage::new(&data, 32, 32, 500).unwrap();
        let grid = BlockGrid::new(32, 32, 16);
        let flow = block_flow(&img, &grid, &sobel(&img));
        assert!(flow.iter().all(|f| f.coherence == 0.0 && f.contrast == 0.0));
    }

    #[test]
    fn test_curvature_of_parallel_flow_is_zero() {
        let grid = BlockGrid::new(48, 48, 16);
        let orientation = vec![0.7f32; grid.len()];
        let valid = vec![true; grid.len()];
        let c = curvature(&grid, &orientation, &valid);
        assert!(c.iter().all(|&v| v < 1e-5));
    }

    #[test]
    fn test_curvature_of_crossing_flow_is_high() {
        let grid = BlockGrid::new(48, 48, 16);
        let mut orientation = vec![0.0f32; grid.len()];
        for (i, o) in orientation.iter_mut().enumerate() {
            if i % 2 == 1 {
                *o = FRAC_PI_2;
            }
        }
        let valid = vec![true; grid.len()];
        let c = curvature(&grid, &orientation, &valid);
        assert!(c[grid.index(1, 1)] > 0.5);
    }
}
