//! Integration tests for the matcher through the public entry points

mod common;

use ridgeline::matcher::cluster_score;
use ridgeline::tools::Pose;
use ridgeline::{Config, FpError, MinutiaRecord, detect_minutiae, match_minutiae, match_records};

#[test]
fn test_empty_and_single_sets_score_zero() {
    let cfg = Config::default();
    let one = vec![MinutiaRecord::new(10, 10, 0)];
    let many = common::scatter(1, 30, 300);
    assert_eq!(match_records(&[], &[], &cfg).unwrap().score, 0);
    assert_eq!(match_records(&one, &one, &cfg).unwrap().score, 0);
    assert_eq!(match_records(&one, &many, &cfg).unwrap().score, 0);
    assert_eq!(match_records(&many, &[], &cfg).unwrap().score, 0);
}

#[test]
fn test_self_match_dominates_impostors() {
    let cfg = Config::default();
    let probe = common::scatter(11, 40, 360);
    let own = match_records(&probe, &probe, &cfg).unwrap().score;
    assert_eq!(own, cluster_score(40));
    for seed in 20..25 {
        let other = common::scatter(seed, 40, 360);
        let impostor = match_records(&probe, &other, &cfg).unwrap().score;
        assert!(impostor < own, "seed {seed}: {impostor} >= {own}");
    }
}

#[test]
fn test_rotation_and_translation_are_tolerated() {
    let cfg = Config::default();
    let probe = common::scatter(7, 30, 300);
    let moved = common::transform(&probe, 20.0, 170.0, 170.0, 100, 100);
    let genuine = match_records(&probe, &moved, &cfg).unwrap().score;
    let impostor = match_records(&probe, &common::scatter(8, 30, 300), &cfg).unwrap().score;
    assert!(genuine >= cluster_score(27), "genuine {genuine}");
    assert!(genuine > impostor);
}

#[test]
fn test_oversized_lists_are_truncated() {
    let cfg = Config::default();
    let big = common::scatter(3, 200, 2000);
    let result = match_records(&big, &big, &cfg).unwrap();
    assert_eq!(result.probe_count, cfg.matcher.max_minutiae);
    assert_eq!(result.gallery_count, cfg.matcher.max_minutiae);
    assert!(result.score > 0);
}

#[test]
fn test_malformed_records_are_rejected() {
    let cfg = Config::default();
    let mut records = common::scatter(5, 12, 200);
    records[3].direction = 360;
    let err = match_records(&records, &records, &cfg).unwrap_err();
    assert!(matches!(err, FpError::InvalidMinutia { index: 3, .. }));
    assert!(err.is_invalid_input());

    records[3] = MinutiaRecord::new(-1, 5, 0);
    let good = common::scatter(6, 12, 200);
    assert!(match_records(&good, &records, &cfg).is_err());
}

#[test]
fn test_scores_are_deterministic() {
    let cfg = Config::default();
    let a = common::scatter(40, 60, 400);
    let b = common::transform(&a, -12.0, 200.0, 200.0, 120, 80);
    let first = match_records(&a, &b, &cfg).unwrap();
    for _ in 0..5 {
        assert_eq!(match_records(&a, &b, &cfg).unwrap(), first);
    }
}

#[test]
fn test_detected_genuine_pair_beats_impostor() {
    let (w, h) = (320, 320);
    let cfg = Config::default();
    let detect = |seed: u32, pose: Pose| detect_minutiae(&common::print(seed, w, h, pose), w, h, 500, &cfg).unwrap().0;

    let probe = detect(1, Pose::default());
    let genuine = detect(
        1,
        Pose {
            rotation: 10.0,
            dx: 6.0,
            dy: -4.0,
        },
    );
    let impostor = detect(2, Pose::default());

    let g = match_minutiae(&probe, &genuine, &cfg).score;
    let i = match_minutiae(&probe, &impostor, &cfg).score;
    assert!(g > i, "genuine {g} impostor {i}");
}

#[test]
fn test_invalid_config_is_rejected() {
    let records = common::scatter(9, 12, 200);
    let mut cfg = Config::default();
    cfg.matcher.rotation_tolerance = -5;
    assert!(matches!(
        match_records(&records, &records, &cfg),
        Err(FpError::InvalidConfig(_))
    ));

    let mut cfg = Config::default();
    cfg.matcher.max_minutiae = ridgeline::config::MAX_MATCH_MINUTIAE + 1;
    assert!(match_records(&records, &records, &cfg).is_err());
}
