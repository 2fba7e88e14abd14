pub mod image;
pub mod matrix;
pub mod minutia;
pub mod point;
pub mod results;

pub use image::GrayscaleImage;
pub use matrix::BinarizedImage;
pub use minutia::{DIRECTION_BINS, Minutia, MinutiaKind, MinutiaRecord, MinutiaSet};
pub use point::Point;
pub use results::{Condition, MatchResult, QualityFeatures, QualityResult, QualityStatus};
