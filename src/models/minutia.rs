use serde::{Deserialize, Serialize};

use super::Point;
use crate::error::{FpError, Result};

/// Number of direction bins over 360°; one bin is one degree.
pub const DIRECTION_BINS: u16 = 360;

/// Ridge feature type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinutiaKind {
    /// A ridge stops
    RidgeEnding,
    /// A ridge splits in two
    Bifurcation,
}

/// Detected minutia
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Minutia {
    /// Column, in `[0, width)`
    pub x: u32,
    /// Row, in `[0, height)`
    pub y: u32,
    /// Direction in `[0, DIRECTION_BINS)`, measured from +x toward +y
    pub direction: u16,
    /// Ending or bifurcation
    pub kind: MinutiaKind,
    /// Confidence the feature is genuine, in `[0, 1]`
    pub reliability: f32,
}

impl Minutia {
    /// Direction in radians
    pub fn direction_radians(&self) -> f32 {
        (self.direction as f32).to_radians()
    }

    /// Pixel position as a point
    pub fn position(&self) -> Point {
        Point::new(self.x as f32, self.y as f32)
    }
}

/// Minutia as supplied for direct matching
///
/// Only position and direction are required; `kind` and `reliability` are
/// carried when the record came from detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinutiaRecord {
    /// Column in pixels
    pub x: i32,
    /// Row in pixels
    pub y: i32,
    /// Direction in degrees, `[0, 360)`
    pub direction: i32,
    /// Feature type, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MinutiaKind>,
    /// Reliability, if known; absent records rank as fully reliable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability: Option<f32>,
}

impl MinutiaRecord {
    /// Record with position and direction only
    pub fn new(x: i32, y: i32, direction: i32) -> Self {
        Self {
            x,
            y,
            direction,
            kind: None,
            reliability: None,
        }
    }

    /// Check the record shape; `index` is reported back in the error.
    pub fn validate(&self, index: usize) -> Result<()> {
        let fail = |reason: String| Err(FpError::InvalidMinutia { index, reason });
        if self.x < 0 || self.y < 0 {
            return fail(format!("negative coordinates ({}, {})", self.x, self.y));
        }
        if !(0..i32::from(DIRECTION_BINS)).contains(&self.direction) {
            return fail(format!("direction {} outside [0, 360)", self.direction));
        }
        if let Some(r) = self.reliability {
            if !(0.0..=1.0).contains(&r) {
                return fail(format!("reliability {r} outside [0, 1]"));
            }
        }
        Ok(())
    }

    /// Ranking weight used when truncating to the cap
    pub fn reliability_or_default(&self) -> f32 {
        self.reliability.unwrap_or(1.0)
    }
}

impl From<&Minutia> for MinutiaRecord {
    fn from(m: &Minutia) -> Self {
        Self {
            x: m.x as i32,
            y: m.y as i32,
            direction: i32::from(m.direction),
            kind: Some(m.kind),
            reliability: Some(m.reliability),
        }
    }
}

/// Keep at most `cap` items with the highest reliability.
///
/// Ties go to the earlier item and survivors stay in their original order.
pub(crate) fn keep_most_reliable<T>(items: Vec<T>, cap: usize, reliability: impl Fn(&T) -> f32) -> Vec<T> {
    if items.len() <= cap {
        return items;
    }
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        reliability(&items[b])
            .total_cmp(&reliability(&items[a]))
            .then(a.cmp(&b))
    });
    let mut keep = vec![false; items.len()];
    for &i in order.iter().take(cap) {
        keep[i] = true;
    }
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, k)| k.then_some(item))
        .collect()
}

/// Ordered minutiae with a cardinality cap
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MinutiaSet {
    minutiae: Vec<Minutia>,
}

impl MinutiaSet {
    /// Build a set, truncating to the `cap` most reliable entries.
    pub fn new(minutiae: Vec<Minutia>, cap: usize) -> Self {
        Self {
            minutiae: keep_most_reliable(minutiae, cap, |m| m.reliability),
        }
    }

    /// Set with no minutiae
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of minutiae
    pub fn len(&self) -> usize {
        self.minutiae.len()
    }

    /// True if there are no minutiae
    pub fn is_empty(&self) -> bool {
        self.minutiae.is_empty()
    }

    /// Minutiae in detection order
    pub fn as_slice(&self) -> &[Minutia] {
        &self.minutiae
    }

    /// Iterate in detection order
    pub fn iter(&self) -> std::slice::Iter<'_, Minutia> {
        self.minutiae.iter()
    }

    /// Records suitable for [`match_records`](crate::match_records)
    pub fn to_records(&self) -> Vec<MinutiaRecord> {
        self.minutiae.iter().map(MinutiaRecord::from).collect()
    }

    /// Consume into the underlying vector
    pub fn into_vec(self) -> Vec<Minutia> {
        self.minutiae
    }
}

impl<'a> IntoIterator for &'a MinutiaSet {
    type Item = &'a Minutia;
    type IntoIter = std::slice::Iter<'a, Minutia>;

    fn into_iter(self) -> Self::IntoIter {
        self.minutiae.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(x: u32, reliability: f32) -> Minutia {
        Minutia {
            x,
            y: 0,
            direction: 0,
            kind: MinutiaKind::RidgeEnding,
            reliability,
        }
    }

    #[test]
    fn test_truncation_keeps_most_reliable_in_order() {
        let set = MinutiaSet::new(vec![m(0, 0.2), m(1, 0.9), m(2, 0.5), m(3, 0.9)], 2);
        let xs: Vec<u32> = set.iter().map(|m| m.x).collect();
        assert_eq!(xs, vec![1, 3]);
    }

    #[test]
    fn test_truncation_ties_break_by_detection_order() {
        let set = MinutiaSet::new(vec![m(0, 0.5), m(1, 0.5), m(2, 0.5)], 2);
        let xs: Vec<u32> = set.iter().map(|m| m.x).collect();
        assert_eq!(xs, vec![0, 1]);
    }

    #[test]
    fn test_under_cap_is_untouched() {
        let set = MinutiaSet::new(vec![m(5, 0.1), m(4, 0.3)], 150);
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].x, 5);
    }

    #[test]
    fn test_record_validation() {
        assert!(MinutiaRecord::new(10, 20, 359).validate(0).is_ok());
        assert!(MinutiaRecord::new(-1, 20, 0).validate(0).is_err());
        assert!(MinutiaRecord::new(1, 2, 360).validate(0).is_err());
        let mut r = MinutiaRecord::new(1, 2, 3);
        r.reliability = Some(1.5);
        assert!(matches!(
            r.validate(4),
            Err(FpError::InvalidMinutia { index: 4, .. })
        ));
    }

    #[test]
    fn test_record_json_shape() {
        let r: MinutiaRecord = serde_json::from_str(r#"{"x":3,"y":4,"direction":90}"#).unwrap();
        assert_eq!(r, MinutiaRecord::new(3, 4, 90));
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"x":3,"y":4,"direction":90}"#);
    }

    #[test]
    fn test_record_from_minutia() {
        let r = MinutiaRecord::from(&m(7, 0.25));
        assert_eq!(r.x, 7);
        assert_eq!(r.kind, Some(MinutiaKind::RidgeEnding));
        assert_eq!(r.reliability, Some(0.25));
    }
}
