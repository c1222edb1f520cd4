//! Body-outline derivation.
//!
//! Turns a run of digits into an ordered polyline by repeatedly picking
//! an element out of a shrinking pool. The pick cursor advances by a
//! scaled copy of each input digit, so the resulting order looks
//! shuffled while staying a pure function of the digits.

use serde::{Deserialize, Serialize};

/// Cursor step multiplier. Changing it changes every critter ever generated.
pub const MIX_MULTIPLIER: f32 = 19.032001;

/// One vertex of a critter's outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutlinePoint {
    /// Original position of the digit within the input run.
    pub x: i32,
    /// Digit value reduced modulo the run length.
    pub y: i32,
}

impl OutlinePoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Derives an outline with exactly one point per input digit.
///
/// Every input index appears exactly once in the output.
pub fn derive_outline(digits: &[u8]) -> Vec<OutlinePoint> {
    let n = digits.len();
    let mut pool: Vec<(usize, u8)> = digits.iter().copied().enumerate().collect();
    let mut outline = Vec::with_capacity(n);
    let mut cursor = 0usize;

    for &digit in digits {
        let step = (f32::from(digit) * MIX_MULTIPLIER).floor() as usize;
        cursor = (cursor + step) % pool.len();

        let (index, value) = pool.remove(cursor);
        outline.push(OutlinePoint::new(index as i32, (usize::from(value) % n) as i32));
    }

    tracing::trace!(digits = ?digits, outline = ?outline, "Derived outline");
    outline
}

/// Derives an outline from a numeric value zero-padded to `width` digits.
pub fn derive_outline_from_value(value: u32, width: usize) -> Vec<OutlinePoint> {
    let mut digits = vec![0u8; width];
    let mut rest = value;
    for slot in digits.iter_mut().rev() {
        *slot = (rest % 10) as u8;
        rest /= 10;
    }
    derive_outline(&digits)
}

/// Walks the closed outline, including the segment from the last point back
/// to the first, and returns the point at fraction `t` of its perimeter.
///
/// `t` is clamped to `[0, 1]`. Returns `None` for an empty outline. An
/// outline whose points all coincide has no perimeter and anchors at its
/// first point.
pub fn point_along_outline(outline: &[OutlinePoint], t: f32) -> Option<(f32, f32)> {
    let first = outline.first()?;
    let start = (first.x as f32, first.y as f32);

    let segments: Vec<((f32, f32), (f32, f32), f32)> = outline
        .iter()
        .zip(outline.iter().cycle().skip(1))
        .map(|(a, b)| {
            let from = (a.x as f32, a.y as f32);
            let to = (b.x as f32, b.y as f32);
            (from, to, (to.0 - from.0).hypot(to.1 - from.1))
        })
        .collect();

    let perimeter: f32 = segments.iter().map(|s| s.2).sum();
    if perimeter <= 0.0 {
        return Some(start);
    }

    let target = perimeter * t.clamp(0.0, 1.0);
    let mut walked = 0.0;
    for &(from, to, length) in &segments {
        if length > 0.0 && walked + length >= target {
            let f = ((target - walked) / length).clamp(0.0, 1.0);
            return Some((from.0 + (to.0 - from.0) * f, from.1 + (to.1 - from.1) * f));
        }
        walked += length;
    }
    // rounding left the target just past the summed segments
    Some(start)
}
