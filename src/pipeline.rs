//! Orchestration over the engines: owned fingerprints, batches and 1:N search
//!
//! Each engine call is independent, so batches fan out over rayon with no
//! shared state beyond the immutable [`Config`].

use std::sync::OnceLock;

use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::Config;
use crate::detector::{self, Detection};
use crate::error::Result;
use crate::matcher;
use crate::models::{BinarizedImage, GrayscaleImage, MatchResult, MinutiaSet, QualityResult};
use crate::quality;

/// Gallery entry and its score against the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Position in the gallery slice
    pub index: usize,
    /// Match score
    pub score: u32,
}

/// Score `probe` against every gallery set in parallel.
///
/// Sorted by descending score, ties by ascending gallery index.
pub fn identify(probe: &MinutiaSet, gallery: &[MinutiaSet], cfg: &Config) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = gallery
        .par_iter()
        .enumerate()
        .map(|(index, g)| Candidate {
            index,
            score: matcher::match_sets(probe, g, &cfg.matcher).score,
        })
        .collect();
    candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.index.cmp(&b.index)));
    debug!(
        "identify: {} gallery sets, best {:?}",
        gallery.len(),
        candidates.first()
    );
    candidates
}

/// Detect minutiae in every image in parallel; results keep input order.
pub fn detect_batch(images: &[GrayscaleImage<'_>], cfg: &Config) -> Vec<Detection> {
    images
        .par_iter()
        .map(|img| detector::detect(img, &cfg.detect))
        .collect()
}

/// Assess every image in parallel; each entry succeeds or fails on its own.
pub fn assess_batch(images: &[GrayscaleImage<'_>], cfg: &Config) -> Vec<Result<QualityResult>> {
    images
        .par_iter()
        .map(|img| quality::assess(img, cfg))
        .collect()
}

/// Owned fingerprint image with lazily computed, cached results
#[derive(Debug)]
pub struct Fingerprint {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
    ppi: u32,
    config: Config,
    detection: OnceLock<Detection>,
    quality: OnceLock<Result<QualityResult>>,
}

impl Fingerprint {
    /// Take ownership of a pixel buffer after validating its shape.
    pub fn new(pixels: Vec<u8>, width: usize, height: usize, ppi: u32, config: Config) -> Result<Self> {
        GrayscaleImage::new(&pixels, width, height, ppi)?;
        config.validate()?;
        Ok(Self {
            pixels,
            width,
            height,
            ppi,
            config,
            detection: OnceLock::new(),
            quality: OnceLock::new(),
        })
    }

    /// Borrowed view of the pixels
    pub fn image(&self) -> GrayscaleImage<'_> {
        GrayscaleImage::from_validated(&self.pixels, self.width, self.height, self.ppi)
    }

    /// Configuration used for every computation
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full detection output, computed once
    pub fn detection(&self) -> &Detection {
        self.detection
            .get_or_init(|| detector::detect(&self.image(), &self.config.detect))
    }

    /// Detected minutiae
    pub fn minutiae(&self) -> &MinutiaSet {
        &self.detection().minutiae
    }

    /// Binarized image the minutiae came from
    pub fn binarized(&self) -> &BinarizedImage {
        &self.detection().binarized
    }

    /// Quality assessment, computed once
    pub fn quality(&self) -> Result<QualityResult> {
        self.quality
            .get_or_init(|| quality::assess(&self.image(), &self.config))
            .clone()
    }

    /// Match against `other` as probe; accepted when `score >= threshold`.
    pub fn verify(&self, other: &Fingerprint, threshold: u32) -> (MatchResult, bool) {
        let result = matcher::match_sets(self.minutiae(), other.minutiae(), &self.config.matcher);
        (result, result.score >= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FpError;
    use crate::models::{Minutia, MinutiaKind};

    fn set(points: &[(u32, u32, u16)]) -> MinutiaSet {
        let minutiae = points
            .iter()
            .map(|&(x, y, direction)| Minutia {
                x,
                y,
                direction,
                kind: MinutiaKind::RidgeEnding,
                reliability: 0.9,
            })
            .collect();
        MinutiaSet::new(minutiae, 150)
    }

    fn grid_set(offset: u32, turn: u16) -> MinutiaSet {
        let points: Vec<_> = (0..12u32)
            .map(|i| (30 + (i % 4) * 37 + offset, 30 + (i / 4) * 41 + (i * 7) % 13, ((i * 53) as u16 + turn) % 360))
            .collect();
        set(&points)
    }

    #[test]
    fn test_identify_ranks_self_first() {
        let probe = grid_set(0, 0);
        let gallery = vec![grid_set(3, 170), probe.clone(), MinutiaSet::empty()];
        let ranked = identify(&probe, &gallery, &Config::default());
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[0].score, matcher::cluster_score(12));
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_identify_ties_by_index() {
        let probe = grid_set(0, 0);
        let gallery = vec![MinutiaSet::empty(), MinutiaSet::empty()];
        let ranked = identify(&probe, &gallery, &Config::default());
        assert_eq!(ranked.iter().map(|c| c.index).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_fingerprint_rejects_bad_buffer() {
        let err = Fingerprint::new(vec![0; 10], 4, 4, 500, Config::default()).unwrap_err();
        assert_eq!(err, FpError::BufferSizeMismatch(10, 16));
    }

    #[test]
    fn test_fingerprint_caches_and_verifies() {
        let fp = Fingerprint::new(vec![128; 64 * 64], 64, 64, 500, Config::default()).unwrap();
        assert!(fp.minutiae().is_empty());
        assert!(std::ptr::eq(fp.detection(), fp.detection()));
        let (result, accepted) = fp.verify(&fp, 1);
        assert_eq!(result.score, 0);
        assert!(!accepted);
        assert_eq!(fp.quality().unwrap().class, quality::WORST_CLASS);
    }

    #[test]
    fn test_batches_keep_order() {
        let flat = vec![90u8; 64 * 64];
        let imgs = vec![
            GrayscaleImage::new(&flat, 64, 64, 500).unwrap(),
            GrayscaleImage::new(&flat, 64, 64, 500).unwrap(),
        ];
        let cfg = Config::default();
        assert_eq!(detect_batch(&imgs, &cfg).len(), 2);
        let q = assess_batch(&imgs, &cfg);
        assert!(q.iter().all(|r| r.as_ref().map(|q| q.class) == Ok(5)));
    }
}
