//! File and fixture helpers for the CLI, tests and benchmarks
//!
//! Engines never touch the filesystem; everything that does lives here.

use crate::error::FpError;
use crate::models::{BinarizedImage, MinutiaRecord, Point};
use std::f32::consts::PI;
use std::fs;
use std::path::Path;

/// Failures of the file-facing helpers
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Image decoding or encoding failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An engine rejected the input.
    #[error(transparent)]
    Engine(#[from] FpError),

    /// A minutiae text file is malformed.
    #[error("Line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}

/// Load any supported image file as 8-bit grayscale with its dimensions.
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<(Vec<u8>, usize, usize), ToolError> {
    let gray = image::open(path)?.to_luma8();
    let (width, height) = gray.dimensions();
    Ok((gray.into_raw(), width as usize, height as usize))
}

/// Save a binarized image as an 8-bit grayscale file; format follows the extension.
pub fn save_binarized<P: AsRef<Path>>(path: P, binarized: &BinarizedImage) -> Result<(), ToolError> {
    save_grayscale(path, binarized.as_bytes(), binarized.width(), binarized.height())
}

/// Save raw grayscale pixels; format follows the extension.
pub fn save_grayscale<P: AsRef<Path>>(path: P, pixels: &[u8], width: usize, height: usize) -> Result<(), ToolError> {
    image::save_buffer(
        path,
        pixels,
        width as u32,
        height as u32,
        image::ColorType::L8,
    )?;
    Ok(())
}

/// Parse `x y theta [quality]` lines; `#` starts a comment.
///
/// `quality` is a 0–100 reliability percentage.
pub fn parse_xyt(text: &str) -> Result<Vec<MinutiaRecord>, ToolError> {
    let mut records = Vec::new();
    for (n, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let fail = |reason: String| ToolError::Parse { line: n + 1, reason };
        let fields: Vec<i32> = line
            .split_whitespace()
            .map(|t| t.parse::<i32>().map_err(|e| fail(format!("{t:?}: {e}"))))
            .collect::<Result<_, _>>()?;
        let mut record = match fields.as_slice() {
            [x, y, t] | [x, y, t, _] => MinutiaRecord::new(*x, *y, *t),
            _ => return Err(fail(format!("expected 3 or 4 fields, found {}", fields.len()))),
        };
        if let Some(&q) = fields.get(3) {
            record.reliability = Some(q.clamp(0, 100) as f32 / 100.0);
        }
        records.push(record);
    }
    Ok(records)
}

/// Format records as `x y theta quality` lines.
pub fn format_xyt(records: &[MinutiaRecord]) -> String {
    let mut out = String::new();
    for r in records {
        let q = (r.reliability_or_default() * 100.0).round() as i32;
        out.push_str(&format!("{} {} {} {}\n", r.x, r.y, r.direction, q));
    }
    out
}

/// Read a minutiae text file.
pub fn read_xyt<P: AsRef<Path>>(path: P) -> Result<Vec<MinutiaRecord>, ToolError> {
    parse_xyt(&fs::read_to_string(path)?)
}

/// Write a minutiae text file.
pub fn write_xyt<P: AsRef<Path>>(path: P, records: &[MinutiaRecord]) -> Result<(), ToolError> {
    fs::write(path, format_xyt(records))?;
    Ok(())
}

/// Phase singularity in a synthetic ridge pattern; each one creates a minutia.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Singularity {
    /// Column in pattern coordinates
    pub x: f32,
    /// Row in pattern coordinates
    pub y: f32,
    /// Winding direction, normally ±1
    pub charge: f32,
}

impl Singularity {
    /// Singularity at (x, y)
    pub fn new(x: f32, y: f32, charge: f32) -> Self {
        Self { x, y, charge }
    }
}

/// Rigid placement of the pattern inside the rendered image
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Rotation about the image centre, degrees
    pub rotation: f32,
    /// Horizontal shift in pixels
    pub dx: f32,
    /// Vertical shift in pixels
    pub dy: f32,
}

impl Pose {
    /// Where pattern point (x, y) lands in the rendered image
    pub fn apply(&self, x: f32, y: f32, width: usize, height: usize) -> (f32, f32) {
        let centre = Point::new(width as f32 / 2.0, height as f32 / 2.0);
        let p = Point::new(x, y).rotate_about(&centre, self.rotation.to_radians());
        (p.x + self.dx, p.y + self.dy)
    }
}

/// Render vertical ridges of `period` pixels with the given singularities.
pub fn synthetic_print(width: usize, height: usize, period: f32, singularities: &[Singularity]) -> Vec<u8> {
    synthetic_print_posed(width, height, period, singularities, Pose::default())
}

/// Render the pattern of [`synthetic_print`] placed with `pose`.
pub fn synthetic_print_posed(
    width: usize,
    height: usize,
    period: f32,
    singularities: &[Singularity],
    pose: Pose,
) -> Vec<u8> {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let (s, c) = (-pose.rotation.to_radians()).sin_cos();
    let mut data = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            // Inverse pose: image pixel back to pattern coordinates
            let (ix, iy) = (x as f32 - pose.dx - cx, y as f32 - pose.dy - cy);
            let (px, py) = (cx + ix * c - iy * s, cy + ix * s + iy * c);
            let mut phase = 2.0 * PI * px / period;
            for sg in singularities {
                phase += sg.charge * (py - sg.y).atan2(px - sg.x);
            }
            data[y * width + x] = (128.0 + 100.0 * phase.cos()).clamp(0.0, 255.0) as u8;
        }
    }
    data
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = if gray.is_empty() {
        0
    } else {
        (sum / gray.len() as u64) as u8
    };
    GrayStats { min, max, avg }
}

/// Fraction of ridge pixels in a binarized image.
pub fn ridge_ratio(binarized: &BinarizedImage) -> f64 {
    let total = binarized.width() * binarized.height();
    if total == 0 {
        0.0
    } else {
        binarized.ridge_pixels() as f64 / total as f64
    }
}
