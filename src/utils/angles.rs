/// Angle helpers shared by the detector and the matcher
///
/// Directions live on the full circle (degrees, `[0, 360)`); ridge
/// orientations are axial and live on `[0, π)`.
use std::f32::consts::{PI, TAU};

/// Wrap integer degrees into `[0, 360)`
#[inline]
pub fn normalize_degrees(a: i32) -> i32 {
    a.rem_euclid(360)
}

/// Smallest absolute difference between two directions, in `[0, 180]`
#[inline]
pub fn angle_difference(a: i32, b: i32) -> i32 {
    let d = normalize_degrees(a - b);
    d.min(360 - d)
}

/// Radians to the nearest whole degree in `[0, 360)`
#[inline]
pub fn to_degrees_bin(radians: f32) -> i32 {
    normalize_degrees(radians.to_degrees().round() as i32)
}

/// Wrap an axial orientation into `[0, π)`
#[inline]
pub fn normalize_axis(theta: f32) -> f32 {
    let t = theta.rem_euclid(PI);
    // rem_euclid can land exactly on π through rounding.
    if t >= PI { 0.0 } else { t }
}

/// Smallest difference between two axial orientations, in `[0, π/2]`
#[inline]
pub fn axis_difference(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(PI);
    d.min(PI - d)
}

/// Pick whichever of `axis` and `axis + π` lies nearer `direction`.
///
/// Used to put a traced direction onto the smoother block flow estimate.
pub fn snap_to_axis(direction: f32, axis: f32) -> f32 {
    let forward = axis.rem_euclid(TAU);
    let backward = (axis + PI).rem_euclid(TAU);
    let gap = |a: f32| {
        let d = (direction - a).rem_euclid(TAU);
        d.min(TAU - d)
    };
    if gap(forward) <= gap(backward) {
        forward
    } else {
        backward
    }
}
