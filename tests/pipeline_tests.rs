//! Integration tests for identification and owned fingerprints

mod common;

use ridgeline::tools::Pose;
use ridgeline::{Config, Fingerprint, GrayscaleImage, MinutiaSet, assess_batch, detect_batch, identify};

const W: usize = 288;
const H: usize = 288;

fn fingerprint(seed: u32, pose: Pose) -> Fingerprint {
    Fingerprint::new(common::print(seed, W, H, pose), W, H, 500, Config::default()).unwrap()
}

#[test]
fn test_identify_finds_the_mate() {
    let probe = fingerprint(1, Pose::default());
    let gallery: Vec<MinutiaSet> = [2, 1, 3]
        .into_iter()
        .map(|seed| {
            let pose = Pose {
                rotation: 5.0,
                dx: 3.0,
                dy: 2.0,
            };
            fingerprint(seed, pose).minutiae().clone()
        })
        .collect();
    let ranked = identify(probe.minutiae(), &gallery, probe.config());
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].index, 1);
}

#[test]
fn test_verify_self() {
    let fp = fingerprint(6, Pose::default());
    assert!(fp.minutiae().len() >= 10);
    let (result, accepted) = fp.verify(&fp, 1);
    assert!(accepted);
    assert_eq!(result.probe_count, fp.minutiae().len());
    assert!(fp.quality().is_ok());
}

#[test]
fn test_batch_matches_single_calls() {
    let prints: Vec<Vec<u8>> = (1..4).map(|s| common::print(s, W, H, Pose::default())).collect();
    let images: Vec<GrayscaleImage<'_>> = prints
        .iter()
        .map(|p| GrayscaleImage::new(p, W, H, 500).unwrap())
        .collect();
    let cfg = Config::default();
    let batch = detect_batch(&images, &cfg);
    let quality = assess_batch(&images, &cfg);
    for ((img, d), q) in images.iter().zip(&batch).zip(&quality) {
        let single = ridgeline::detector::detect(img, &cfg.detect);
        assert_eq!(d.minutiae, single.minutiae);
        assert_eq!(q.as_ref().unwrap(), &ridgeline::quality::assess(img, &cfg).unwrap());
    }
}
