//! Positional digit layout.
//!
//! Assigns each critter attribute a window of the origin code plus the
//! display bounds interpolated attributes are mapped into. The layout is
//! static configuration: it is validated once against the lookup tables
//! when the factory is built, never per scan.

use super::tables::{LookupTables, TableKind};
use crate::codec::DigitRange;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Critter attributes that read a digit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Name,
    Font,
    Color,
    Rarity,
    StartLevel,
    Shape,
    LineWidth,
    PupilShape,
    PupilSize,
    EyePosition,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Attribute::Name => "name",
            Attribute::Font => "font",
            Attribute::Color => "color",
            Attribute::Rarity => "rarity",
            Attribute::StartLevel => "start_level",
            Attribute::Shape => "shape",
            Attribute::LineWidth => "line_width",
            Attribute::PupilShape => "pupil_shape",
            Attribute::PupilSize => "pupil_size",
            Attribute::EyePosition => "eye_position",
        };
        f.write_str(label)
    }
}

/// Layout validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("{attribute} range {range} can yield {max_value} but {table} has {len} entries")]
    TableTooSmall {
        attribute: Attribute,
        range: DigitRange,
        max_value: u32,
        table: TableKind,
        len: usize,
    },
    #[error("{attribute} range {range} is wider than {max_width} digits")]
    TooWide {
        attribute: Attribute,
        range: DigitRange,
        max_width: u32,
    },
    #[error("{attribute} bounds [{min}, {max}] are not a finite ascending interval")]
    InvalidBounds { attribute: Attribute, min: f32, max: f32 },
}

/// Output interval for an interpolated attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Digit windows and display bounds for every attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitLayout {
    pub name: DigitRange,
    pub font: DigitRange,
    pub color: DigitRange,
    pub rarity: DigitRange,
    pub start_level: DigitRange,
    pub shape: DigitRange,
    pub line_width: DigitRange,
    pub pupil_shape: DigitRange,
    pub pupil_size: DigitRange,
    pub eye_position: DigitRange,
    pub line_width_bounds: Bounds,
    pub pupil_size_bounds: Bounds,
    pub eye_position_bounds: Bounds,
}

impl Default for DigitLayout {
    fn default() -> Self {
        const fn r(start: u8, end: u8) -> DigitRange {
            DigitRange::fixed(start, end)
        }
        Self {
            name: r(1, 3),
            font: r(4, 4),
            color: r(5, 5),
            rarity: r(6, 6),
            start_level: r(7, 8),
            shape: r(4, 8),
            line_width: r(3, 3),
            pupil_shape: r(2, 2),
            pupil_size: r(8, 8),
            eye_position: r(1, 2),
            line_width_bounds: Bounds::new(0.2, 0.5),
            pupil_size_bounds: Bounds::new(0.1, 0.3),
            eye_position_bounds: Bounds::new(0.0, 1.0),
        }
    }
}

impl DigitLayout {
    /// Every attribute with its window.
    pub fn ranges(&self) -> [(Attribute, DigitRange); 10] {
        [
            (Attribute::Name, self.name),
            (Attribute::Font, self.font),
            (Attribute::Color, self.color),
            (Attribute::Rarity, self.rarity),
            (Attribute::StartLevel, self.start_level),
            (Attribute::Shape, self.shape),
            (Attribute::LineWidth, self.line_width),
            (Attribute::PupilShape, self.pupil_shape),
            (Attribute::PupilSize, self.pupil_size),
            (Attribute::EyePosition, self.eye_position),
        ]
    }

    /// Pairs of attributes whose windows share at least one digit.
    pub fn overlapping_pairs(&self) -> Vec<(Attribute, Attribute)> {
        let ranges = self.ranges();
        let mut pairs = Vec::new();
        for (i, (a, ra)) in ranges.iter().enumerate() {
            for (b, rb) in &ranges[i + 1..] {
                if ra.overlaps(rb) {
                    pairs.push((*a, *b));
                }
            }
        }
        pairs
    }

    /// Checks the layout against the tables it indexes into.
    pub fn validate(&self, tables: &LookupTables) -> Result<(), LayoutError> {
        let indexed = [
            (Attribute::Name, self.name, TableKind::Name),
            (Attribute::Color, self.color, TableKind::Color),
            (Attribute::Font, self.font, TableKind::Font),
            (Attribute::PupilShape, self.pupil_shape, TableKind::PupilSides),
            (Attribute::Rarity, self.rarity, TableKind::Rarity),
        ];
        for (attribute, range, table) in indexed {
            let len = tables.len(table);
            if range.max_value() as usize >= len {
                return Err(LayoutError::TableTooSmall {
                    attribute,
                    range,
                    max_value: range.max_value(),
                    table,
                    len,
                });
            }
        }

        // These are stored as small integers.
        for (attribute, range) in [
            (Attribute::Font, self.font),
            (Attribute::Rarity, self.rarity),
            (Attribute::PupilShape, self.pupil_shape),
            (Attribute::StartLevel, self.start_level),
        ] {
            if range.width() > 2 {
                return Err(LayoutError::TooWide {
                    attribute,
                    range,
                    max_width: 2,
                });
            }
        }

        for (attribute, bounds) in [
            (Attribute::LineWidth, self.line_width_bounds),
            (Attribute::PupilSize, self.pupil_size_bounds),
            (Attribute::EyePosition, self.eye_position_bounds),
        ] {
            if !bounds.is_valid() {
                return Err(LayoutError::InvalidBounds {
                    attribute,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }

        let overlaps = self.overlapping_pairs();
        if !overlaps.is_empty() {
            tracing::debug!(
                count = overlaps.len(),
                pairs = ?overlaps,
                "Digit layout shares positions between attributes"
            );
        }

        Ok(())
    }

    /// Largest start level the layout can produce.
    pub fn max_start_level(&self) -> u32 {
        self.start_level.max_value()
    }
}
