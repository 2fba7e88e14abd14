use crate::error::{FpError, Result};

/// Highest resolution accepted; beyond this block sizes stop making sense.
const MAX_PPI: u32 = 4000;
/// Lowest resolution accepted.
const MIN_PPI: u32 = 100;

/// Borrowed single-channel 8-bit image with its resolution
///
/// The caller owns the pixels; engines only read them for the duration of a call.
#[derive(Debug, Clone, Copy)]
pub struct GrayscaleImage<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    ppi: u32,
}

impl<'a> GrayscaleImage<'a> {
    /// Wrap a row-major pixel buffer, validating its shape and resolution.
    pub fn new(data: &'a [u8], width: usize, height: usize, ppi: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FpError::InvalidImageSize(width, height));
        }
        let expected = width
            .checked_mul(height)
            .ok_or(FpError::InvalidImageSize(width, height))?;
        if data.len() != expected {
            return Err(FpError::BufferSizeMismatch(data.len(), expected));
        }
        if !(MIN_PPI..=MAX_PPI).contains(&ppi) {
            return Err(FpError::InvalidResolution(ppi));
        }
        Ok(Self {
            data,
            width,
            height,
            ppi,
        })
    }

    /// Wrap a buffer whose shape was already checked by [`GrayscaleImage::new`].
    pub(crate) fn from_validated(data: &'a [u8], width: usize, height: usize, ppi: u32) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            data,
            width,
            height,
            ppi,
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Resolution in pixels per inch
    pub fn ppi(&self) -> u32 {
        self.ppi
    }

    /// Raw row-major pixels
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Pixel at (x, y); callers keep coordinates in bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Pixel at signed coordinates, clamped to the nearest edge pixel.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> u8 {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.data[cy * self.width + cx]
    }
}
