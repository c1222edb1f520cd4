//! Digit-level encoding of origin codes.
//!
//! This module holds the pure arithmetic every critter is built from:
//! normalizing scanner text into an 8-digit origin code, reading
//! positional digit windows, interpolating them into display ranges,
//! deriving the outline order, and walking the closed outline to place
//! the eye.

mod digits;
mod shape;

pub use digits::{
    extract_range, interpolate, CodecError, DigitRange, OriginCode, RejectReason, CODE_LENGTH,
    PLACEHOLDER_DIGIT,
};
pub use shape::{
    derive_outline, derive_outline_from_value, point_along_outline, OutlinePoint, MIX_MULTIPLIER,
};
