/// Fixed-size block partition of an image
///
/// The last column and row of blocks may be narrower when the image size is
/// not a multiple of the block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    block_size: usize,
    cols: usize,
    rows: usize,
    width: usize,
    height: usize,
}

/// Pixel rectangle, half-open: `x0..x1`, `y0..y1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// First column
    pub x0: usize,
    /// First row
    pub y0: usize,
    /// One past the last column
    pub x1: usize,
    /// One past the last row
    pub y1: usize,
}

impl PixelRect {
    /// Number of pixels covered
    pub fn area(&self) -> usize {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }
}

impl BlockGrid {
    /// Partition a `width` × `height` image into `block_size` blocks
    pub fn new(width: usize, height: usize, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            block_size,
            cols: width.div_ceil(block_size),
            rows: height.div_ceil(block_size),
            width,
            height,
        }
    }

    /// Block edge in pixels
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Blocks per row
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Blocks per column
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of blocks
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    /// True for a zero-sized image
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear index of block (bx, by)
    #[inline]
    pub fn index(&self, bx: usize, by: usize) -> usize {
        by * self.cols + bx
    }

    /// Linear index of the block containing pixel (x, y)
    #[inline]
    pub fn index_of_pixel(&self, x: usize, y: usize) -> usize {
        self.index(x / self.block_size, y / self.block_size)
    }

    /// Pixels covered by block (bx, by)
    pub fn rect(&self, bx: usize, by: usize) -> PixelRect {
        let x0 = bx * self.block_size;
        let y0 = by * self.block_size;
        PixelRect {
            x0,
            y0,
            x1: (x0 + self.block_size).min(self.width),
            y1: (y0 + self.block_size).min(self.height),
        }
    }

    /// Block (bx, by) grown by `margin` pixels on every side, clipped to the image
    pub fn window(&self, bx: usize, by: usize, margin: usize) -> PixelRect {
        let r = self.rect(bx, by);
        PixelRect {
            x0: r.x0.saturating_sub(margin),
            y0: r.y0.saturating_sub(margin),
            x1: (r.x1 + margin).min(self.width),
            y1: (r.y1 + margin).min(self.height),
        }
    }

    /// Indices of the up-to-8 neighbours of (bx, by) plus the block itself
    pub fn neighbourhood(&self, bx: usize, by: usize) -> impl Iterator<Item = usize> + '_ {
        let x0 = bx.saturating_sub(1);
        let y0 = by.saturating_sub(1);
        let x1 = (bx + 1).min(self.cols - 1);
        let y1 = (by + 1).min(self.rows - 1);
        (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| self.index(x, y)))
    }

    /// Blocks between (bx, by) and the nearest grid edge, counting the block itself
    pub fn edge_distance(&self, bx: usize, by: usize) -> usize {
        (bx + 1)
            .min(by + 1)
            .min(self.cols - bx)
            .min(self.rows - by)
    }
}
