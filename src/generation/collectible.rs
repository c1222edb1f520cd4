//! The collectible record and its colour type.

use crate::codec::{point_along_outline, OriginCode, OutlinePoint};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An RGB colour from the critter palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// HSV hue in `[0, 1)`. Greys report 0.
    pub fn hue(&self) -> f32 {
        let r = f32::from(self.r) / 255.0;
        let g = f32::from(self.g) / 255.0;
        let b = f32::from(self.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        if delta <= f32::EPSILON {
            return 0.0;
        }

        let sector = if max == r {
            ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        (sector / 6.0).rem_euclid(1.0)
    }
}

/// A fully generated critter plus its progression state.
///
/// Everything except `current_level` and `last_scan_time_utc` is fixed
/// at creation and is a pure function of `origin_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collectible {
    pub origin_code: OriginCode,
    pub color: Rgb,
    pub name: String,
    pub font: u8,
    pub rarity: u8,
    pub start_level: u8,
    pub current_level: u8,
    pub body_outline: Vec<OutlinePoint>,
    pub line_width: f32,
    pub pupil_shape: u8,
    pub pupil_size: f32,
    pub eye_position: f32,
    pub first_scan_time_utc: DateTime<Utc>,
    pub last_scan_time_utc: DateTime<Utc>,
}

impl Collectible {
    /// Where the eye sits: `eye_position` of the way around the closed
    /// body outline, in outline coordinates.
    pub fn eye_anchor(&self) -> Option<(f32, f32)> {
        point_along_outline(&self.body_outline, self.eye_position)
    }

    /// UTC calendar date of the most recent counted scan.
    pub fn last_scan_date(&self) -> NaiveDate {
        self.last_scan_time_utc.date_naive()
    }

    /// Returns true if the last counted scan fell on the same UTC date as `now`.
    pub fn scanned_on_same_day(&self, now: DateTime<Utc>) -> bool {
        self.last_scan_date() == now.date_naive()
    }

    /// Returns true if the generated attributes match, ignoring progression.
    pub fn same_traits(&self, other: &Collectible) -> bool {
        self.origin_code == other.origin_code
            && self.color == other.color
            && self.name == other.name
            && self.font == other.font
            && self.rarity == other.rarity
            && self.start_level == other.start_level
            && self.body_outline == other.body_outline
            && self.line_width.to_bits() == other.line_width.to_bits()
            && self.pupil_shape == other.pupil_shape
            && self.pupil_size.to_bits() == other.pupil_size.to_bits()
            && self.eye_position.to_bits() == other.eye_position.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hue_primaries() {
        assert_eq!(Rgb::new(255, 0, 0).hue(), 0.0);
        assert!((Rgb::new(0, 255, 0).hue() - 1.0 / 3.0).abs() < 1e-6);
        assert!((Rgb::new(0, 0, 255).hue() - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(Rgb::new(128, 128, 128).hue(), 0.0);
    }

    fn sample(scanned: DateTime<Utc>) -> Collectible {
        Collectible {
            origin_code: OriginCode::normalize("12345678").unwrap(),
            color: Rgb::new(1, 2, 3),
            name: "Test".into(),
            font: 0,
            rarity: 0,
            start_level: 1,
            current_level: 1,
            body_outline: Vec::new(),
            line_width: 0.2,
            pupil_shape: 0,
            pupil_size: 0.1,
            eye_position: 0.0,
            first_scan_time_utc: scanned,
            last_scan_time_utc: scanned,
        }
    }

    #[test]
    fn test_same_day_uses_utc_date() {
        let scanned = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        let collectible = sample(scanned);

        let same_day = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 1).unwrap();
        let next_day = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 1).unwrap();
        assert!(collectible.scanned_on_same_day(same_day));
        assert!(!collectible.scanned_on_same_day(next_day));
    }

    #[test]
    fn test_eye_anchor_follows_outline() {
        let mut critter = sample(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(critter.eye_anchor(), None);

        critter.body_outline = vec![OutlinePoint::new(0, 0), OutlinePoint::new(4, 0)];
        critter.eye_position = 0.25;
        // out along the first side, then back along the closing one
        assert_eq!(critter.eye_anchor(), Some((2.0, 0.0)));
        critter.eye_position = 0.75;
        assert_eq!(critter.eye_anchor(), Some((2.0, 0.0)));
    }
}
