/// Oriented adaptive binarization
///
/// Each pixel is compared against its own neighbourhood, sampled on a grid
/// rotated to the local ridge flow: the row through the pixel runs along the
/// ridge, the other rows step across it. A pixel is ridge when its row is
/// darker than the grid as a whole.
use rayon::prelude::*;
use std::f32::consts::PI;

use super::RidgeMaps;
use super::maps::DIRECTION_COUNT;
use crate::models::matrix::{BACKGROUND, RIDGE};
use crate::models::{BinarizedImage, GrayscaleImage};

/// One rotated sampling grid per quantized direction
pub(crate) struct RotatedGrids {
    rows: usize,
    cols: usize,
    /// `[direction][row * cols + col]` → (dx, dy)
    offsets: Vec<Vec<(isize, isize)>>,
}

impl RotatedGrids {
    /// Grids with `2 * half_rows + 1` rows across the ridge and
    /// `2 * half_cols + 1` samples along it.
    pub(crate) fn new(half_rows: usize, half_cols: usize) -> Self {
        let rows = 2 * half_rows + 1;
        let cols = 2 * half_cols + 1;
        let offsets = (0..DIRECTION_COUNT)
            .map(|d| {
                let theta = d as f32 * PI / DIRECTION_COUNT as f32;
                let (s, c) = theta.sin_cos();
                let mut grid = Vec::with_capacity(rows * cols);
                for r in 0..rows {
                    let across = r as f32 - half_rows as f32;
                    for k in 0..cols {
                        let along = k as f32 - half_cols as f32;
                        let dx = (along * c - across * s).round() as isize;
                        let dy = (along * s + across * c).round() as isize;
                        grid.push((dx, dy));
                    }
                }
                grid
            })
            .collect();
        Self { rows, cols, offsets }
    }

    /// True when the centre row at (x, y) is darker than the whole grid.
    fn is_ridge(&self, image: &GrayscaleImage, x: usize, y: usize, direction: usize) -> bool {
        let grid = &self.offsets[direction];
        let centre = self.rows / 2;
        let (xi, yi) = (x as isize, y as isize);
        let mut total = 0i64;
        let mut centre_sum = 0i64;
        for r in 0..self.rows {
            let mut row_sum = 0i64;
            for &(dx, dy) in &grid[r * self.cols..(r + 1) * self.cols] {
                row_sum += i64::from(image.get_clamped(xi + dx, yi + dy));
            }
            total += row_sum;
            if r == centre {
                centre_sum = row_sum;
            }
        }
        centre_sum * (self.rows as i64) < total
    }
}

/// Binarize using each block's flow; pixels of invalid blocks become background.
pub(crate) fn oriented_binarize(image: &GrayscaleImage, maps: &RidgeMaps, grids: &RotatedGrids) -> BinarizedImage {
    let width = image.width();
    let height = image.height();
    let grid = maps.grid();
    let mut data = vec![BACKGROUND; width * height];

    data.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, px) in row.iter_mut().enumerate() {
            let idx = grid.index_of_pixel(x, y);
            let Some(direction) = maps.direction_index(idx) else {
                continue;
            };
            if grids.is_ridge(image, x, y, direction) {
                *px = RIDGE;
            }
        }
    });

    BinarizedImage::from_raw(width, height, data)
}
