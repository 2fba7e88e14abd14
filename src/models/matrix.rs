/// Pixel value of a ridge pixel
pub const RIDGE: u8 = 0;
/// Pixel value of a valley or background pixel
pub const BACKGROUND: u8 = 255;

/// Binarized image with the source's dimensions and values in {0, 255}
///
/// `0` marks ridge pixels, `255` valleys and invalid regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinarizedImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinarizedImage {
    /// Create an all-background image with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![BACKGROUND; width * height],
        }
    }

    /// Build from rows already restricted to {0, 255}.
    pub(crate) fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        debug_assert!(data.iter().all(|&v| v == RIDGE || v == BACKGROUND));
        Self {
            width,
            height,
            data,
        }
    }

    /// Get image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get image height
    pub fn height(&self) -> usize {
        self.height
    }

    /// True if (x, y) is a ridge pixel; out of bounds reads as background.
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.data[y * self.width + x] == RIDGE
    }

    /// Mark (x, y) as ridge or background
    pub fn set(&mut self, x: usize, y: usize, ridge: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.data[y * self.width + x] = if ridge { RIDGE } else { BACKGROUND };
    }

    /// Number of ridge pixels
    pub fn ridge_pixels(&self) -> usize {
        self.data.iter().filter(|&&v| v == RIDGE).count()
    }

    /// Raw pixels, row-major, each 0 or 255
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume into the raw pixel buffer
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Ridge mask as 0/1 values, the form the skeleton stages work on.
    pub(crate) fn to_mask(&self) -> Vec<u8> {
        self.data.iter().map(|&v| u8::from(v == RIDGE)).collect()
    }
}

impl Default for BinarizedImage {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
