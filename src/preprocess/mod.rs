//! Block-level ridge analysis and oriented binarization
//!
//! The preprocessor partitions the image into blocks, estimates ridge flow
//! per block, flags blocks whose contrast or flow is too weak to trust, and
//! binarizes the valid area along the local ridge direction.

pub mod blocks;
pub mod maps;

pub(crate) mod binarization;
pub(crate) mod orientation;

pub use blocks::{BlockGrid, PixelRect};
pub use maps::{DIRECTION_COUNT, RidgeMaps};

use log::{debug, trace};

use crate::config::DetectConfig;
use crate::models::{BinarizedImage, Condition, GrayscaleImage};
use binarization::{RotatedGrids, oriented_binarize};

/// Half the rotated grid's row count across the ridge, at 500 ppi.
const GRID_HALF_ROWS_500: usize = 4;
/// Half the rotated grid's sample count along the ridge, at 500 ppi.
const GRID_HALF_COLS_500: usize = 3;

/// Everything the detector needs from one image
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Block-resolution flow and validity
    pub maps: RidgeMaps,
    /// Ridge image, background outside valid blocks
    pub binarized: BinarizedImage,
    /// `Some(EmptyImage)` when no block is valid
    pub condition: Option<Condition>,
}

/// Run block analysis and oriented binarization over `image`.
pub fn preprocess(image: &GrayscaleImage, cfg: &DetectConfig) -> Preprocessed {
    let ppi = image.ppi();
    let grid = BlockGrid::new(image.width(), image.height(), cfg.block_size(ppi));

    let grads = orientation::sobel(image);
    let flow = orientation::block_flow(image, &grid, &grads);
    let valid: Vec<bool> = flow
        .iter()
        .map(|f| f.contrast >= cfg.min_block_contrast && f.coherence >= cfg.min_block_coherence)
        .collect();
    let smoothed = orientation::smooth_orientations(&grid, &flow, &valid);
    let curvature = orientation::curvature(&grid, &smoothed, &valid);
    let maps = RidgeMaps::build(grid, &flow, smoothed, &curvature, &valid, cfg);

    let valid_blocks = maps.valid_blocks();
    debug!(
        "preprocess: {}x{} @ {} ppi, block {} px, {}/{} blocks valid ({} low contrast, {} low flow, {} high curvature)",
        image.width(),
        image.height(),
        ppi,
        grid.block_size(),
        valid_blocks,
        grid.len(),
        maps.low_contrast_map().iter().filter(|&&b| b).count(),
        maps.low_flow_map().iter().filter(|&&b| b).count(),
        maps.high_curvature_map().iter().filter(|&&b| b).count(),
    );

    if valid_blocks == 0 {
        debug!("preprocess: empty image");
        return Preprocessed {
            binarized: BinarizedImage::new(image.width(), image.height()),
            maps,
            condition: Some(Condition::EmptyImage),
        };
    }

    let grids = RotatedGrids::new(
        cfg.scaled(GRID_HALF_ROWS_500, ppi),
        cfg.scaled(GRID_HALF_COLS_500, ppi),
    );
    let binarized = oriented_binarize(image, &maps, &grids);
    trace!("preprocess: {} ridge pixels", binarized.ridge_pixels());

    Preprocessed {
        maps,
        binarized,
        condition: None,
    }
}
