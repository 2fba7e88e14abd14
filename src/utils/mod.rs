//! Shared numeric helpers
//!
//! - Angles (wrapping, differences, axial orientations)

pub mod angles;
