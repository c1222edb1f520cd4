//! Origin-code normalization and positional digit extraction.
//!
//! Every attribute of a critter is read from a fixed window of the
//! 8-digit origin code. Windows are addressed 1-based and inclusive,
//! always against the fixed-width string form so leading zeros count.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of digits in an origin code.
pub const CODE_LENGTH: usize = 8;

/// Digit substituted for any non-digit character in scanned text.
pub const PLACEHOLDER_DIGIT: u8 = b'0';

/// Why a piece of scanned text cannot become an origin code.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("barcode text has {len} characters, need {}", CODE_LENGTH)]
    TooShort { len: usize },
    #[error("barcode text has {len} characters, at most {} allowed", CODE_LENGTH)]
    TooLong { len: usize },
}

/// Errors raised while building digit windows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("digit range {start}..={end} is outside 1..={} or reversed", CODE_LENGTH)]
    InvalidRange { start: u8, end: u8 },
}

/// Canonical 8-digit identity of a collectible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OriginCode([u8; CODE_LENGTH]);

impl OriginCode {
    /// Normalizes raw scanner text into an origin code.
    ///
    /// Non-digit characters become [`PLACEHOLDER_DIGIT`]. Length is
    /// counted in characters, not bytes.
    pub fn normalize(text: &str) -> Result<Self, RejectReason> {
        let len = text.chars().count();
        if len < CODE_LENGTH {
            return Err(RejectReason::TooShort { len });
        }
        if len > CODE_LENGTH {
            return Err(RejectReason::TooLong { len });
        }

        let mut digits = [PLACEHOLDER_DIGIT; CODE_LENGTH];
        for (slot, c) in digits.iter_mut().zip(text.chars()) {
            if c.is_ascii_digit() {
                *slot = c as u8;
            }
        }
        Ok(Self(digits))
    }

    /// Returns the code as its numeric value.
    pub fn value(&self) -> u32 {
        self.0
            .iter()
            .fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'))
    }

    /// Returns the digit values (0-9) inside `range`, most significant first.
    pub fn digits(&self, range: DigitRange) -> Vec<u8> {
        let start = usize::from(range.start) - 1;
        let end = usize::from(range.end);
        self.0[start..end].iter().map(|b| b - b'0').collect()
    }

    /// Extracts the integer formed by the digits in `range`.
    pub fn extract(&self, range: DigitRange) -> u32 {
        extract_range(self.value(), range)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("00000000")
    }
}

impl fmt::Display for OriginCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OriginCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OriginCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.len() != CODE_LENGTH || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(serde::de::Error::custom(format!(
                "origin code must be {CODE_LENGTH} digits, got {text:?}"
            )));
        }
        Self::normalize(&text).map_err(serde::de::Error::custom)
    }
}

/// A 1-based inclusive window of digit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct DigitRange {
    start: u8,
    end: u8,
}

impl DigitRange {
    /// Creates a window, failing fast on positions outside the code.
    pub fn new(start: u8, end: u8) -> Result<Self, CodecError> {
        if start == 0 || start > end || usize::from(end) > CODE_LENGTH {
            return Err(CodecError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a window from positions fixed at compile time.
    ///
    /// Panics on an invalid window; in a const context that is a build error.
    pub const fn fixed(start: u8, end: u8) -> Self {
        assert!(start >= 1 && start <= end && end as usize <= CODE_LENGTH);
        Self { start, end }
    }

    /// First position (1-based).
    #[inline]
    pub fn start(&self) -> u8 {
        self.start
    }

    /// Last position (1-based, inclusive).
    #[inline]
    pub fn end(&self) -> u8 {
        self.end
    }

    /// Number of digits covered.
    #[inline]
    pub fn width(&self) -> u32 {
        u32::from(self.end - self.start) + 1
    }

    /// Largest value the window can produce.
    pub fn max_value(&self) -> u32 {
        10u32.pow(self.width()) - 1
    }

    /// Returns true if both windows share a position.
    pub fn overlaps(&self, other: &DigitRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl TryFrom<(u8, u8)> for DigitRange {
    type Error = CodecError;

    fn try_from((start, end): (u8, u8)) -> Result<Self, Self::Error> {
        Self::new(start, end)
    }
}

impl From<DigitRange> for (u8, u8) {
    fn from(range: DigitRange) -> Self {
        (range.start, range.end)
    }
}

impl fmt::Display for DigitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Extracts the digits in `range` from an 8-digit `code`.
///
/// `code` is read as if zero-padded to [`CODE_LENGTH`] digits.
pub fn extract_range(code: u32, range: DigitRange) -> u32 {
    let length = CODE_LENGTH as u32;
    let high = 10u32.pow(length - (u32::from(range.start) - 1));
    let low = 10u32.pow(length - u32::from(range.end));
    (code % high) / low
}

/// Maps `value` from `[0, 10^digit_count - 1]` linearly onto `[min, max]`.
pub fn interpolate(value: u32, digit_count: u32, min: f32, max: f32) -> f32 {
    let input_max = 10u64.pow(digit_count).saturating_sub(1);
    if input_max == 0 {
        return min;
    }

    let t = (value as f32 / input_max as f32).clamp(0.0, 1.0);
    if t >= 1.0 {
        return max;
    }
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    (min + (max - min) * t).clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn range(start: u8, end: u8) -> DigitRange {
        DigitRange::new(start, end).unwrap()
    }

    #[test]
    fn test_normalize_plain_digits() {
        let code = OriginCode::normalize("12345678").unwrap();
        assert_eq!(code.as_str(), "12345678");
        assert_eq!(code.value(), 12_345_678);
    }

    #[test]
    fn test_normalize_replaces_letters() {
        let code = OriginCode::normalize("1A34B6C8").unwrap();
        assert_eq!(code.as_str(), "10340608");
        assert_eq!(OriginCode::normalize("1A34B6C8").unwrap(), code);
    }

    #[test]
    fn test_normalize_keeps_leading_zeros() {
        let code = OriginCode::normalize("00012345").unwrap();
        assert_eq!(code.as_str(), "00012345");
        assert_eq!(code.extract(range(1, 3)), 0);
        assert_eq!(code.digits(range(1, 5)), vec![0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_normalize_rejects_bad_lengths() {
        assert_eq!(
            OriginCode::normalize("1234567"),
            Err(RejectReason::TooShort { len: 7 })
        );
        assert_eq!(
            OriginCode::normalize("123456789"),
            Err(RejectReason::TooLong { len: 9 })
        );
    }

    #[test]
    fn test_extract_windows() {
        let code = 12_345_678;
        assert_eq!(extract_range(code, range(1, 8)), 12_345_678);
        assert_eq!(extract_range(code, range(1, 3)), 123);
        assert_eq!(extract_range(code, range(4, 4)), 4);
        assert_eq!(extract_range(code, range(7, 8)), 78);
        assert_eq!(extract_range(code, range(4, 8)), 45_678);
    }

    #[test]
    fn test_invalid_ranges_fail_fast() {
        assert!(DigitRange::new(0, 3).is_err());
        assert!(DigitRange::new(4, 3).is_err());
        assert!(DigitRange::new(2, 9).is_err());
        assert!(DigitRange::new(8, 8).is_ok());
    }

    #[test]
    fn test_overlap() {
        assert!(range(1, 3).overlaps(&range(3, 5)));
        assert!(!range(1, 3).overlaps(&range(4, 8)));
    }

    #[test]
    fn test_interpolate_endpoints() {
        assert_eq!(interpolate(0, 1, 0.2, 0.5), 0.2);
        assert_eq!(interpolate(9, 1, 0.2, 0.5), 0.5);
        assert_eq!(interpolate(99, 2, 0.1, 0.3), 0.3);
        let mid = interpolate(5, 1, 0.0, 9.0);
        assert!((mid - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_origin_code_json_round_trip() {
        let code = OriginCode::normalize("01234567").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"01234567\"");
        let back: OriginCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<OriginCode>("\"1234\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_full_range_is_identity(code in 0u32..100_000_000) {
            prop_assert_eq!(extract_range(code, range(1, 8)), code);
        }

        #[test]
        fn prop_interpolate_monotonic(
            digits in 1u32..=3,
            a in 0u32..1000,
            b in 0u32..1000,
        ) {
            let max_value = 10u32.pow(digits) - 1;
            let (a, b) = (a.min(max_value), b.min(max_value));
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(interpolate(lo, digits, 0.1, 0.3) <= interpolate(hi, digits, 0.1, 0.3));
        }

        #[test]
        fn prop_interpolate_hits_bounds(digits in 1u32..=4) {
            let max_value = 10u32.pow(digits) - 1;
            prop_assert_eq!(interpolate(0, digits, 0.2, 0.5), 0.2);
            prop_assert_eq!(interpolate(max_value, digits, 0.2, 0.5), 0.5);
        }

        #[test]
        fn prop_normalize_is_deterministic(text in "[0-9A-Z]{8}") {
            let first = OriginCode::normalize(&text).unwrap();
            let second = OriginCode::normalize(&text).unwrap();
            prop_assert_eq!(first, second);
            prop_assert!(first.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
