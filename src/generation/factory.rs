//! Collectible construction.

use super::collectible::Collectible;
use super::layout::{Bounds, DigitLayout, LayoutError};
use super::tables::{LookupError, LookupTables};
use crate::codec::{derive_outline, interpolate, DigitRange, OriginCode, RejectReason};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while generating a collectible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The scanned text is not a usable barcode.
    #[error("barcode rejected: {0}")]
    Rejected(#[from] RejectReason),
    /// The layout indexed past the end of a table.
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

/// Builds collectibles from barcode text.
///
/// Generation is a pure function of the text, the layout and the tables.
/// Nothing is persisted here.
#[derive(Debug, Clone)]
pub struct CollectibleFactory {
    layout: DigitLayout,
    tables: LookupTables,
}

impl CollectibleFactory {
    /// Creates a factory after checking the layout against the tables.
    pub fn new(layout: DigitLayout, tables: LookupTables) -> Result<Self, LayoutError> {
        layout.validate(&tables)?;
        Ok(Self { layout, tables })
    }

    /// Returns the digit layout.
    pub fn layout(&self) -> &DigitLayout {
        &self.layout
    }

    /// Returns the lookup tables.
    pub fn tables(&self) -> &LookupTables {
        &self.tables
    }

    /// Generates a collectible stamped with the current time.
    pub fn create(&self, barcode_text: &str) -> Result<Collectible, GenerationError> {
        self.create_at(barcode_text, Utc::now())
    }

    /// Generates a collectible stamped with `now`.
    pub fn create_at(
        &self,
        barcode_text: &str,
        now: DateTime<Utc>,
    ) -> Result<Collectible, GenerationError> {
        let code = OriginCode::normalize(barcode_text)?;
        self.create_from_code(code, now)
    }

    /// Generates a collectible for an already-normalized origin code.
    pub fn create_from_code(
        &self,
        code: OriginCode,
        now: DateTime<Utc>,
    ) -> Result<Collectible, GenerationError> {
        let layout = &self.layout;

        let name = self.tables.name(code.extract(layout.name))?.to_owned();
        let color = self.tables.color(code.extract(layout.color))?;

        let font = code.extract(layout.font);
        self.tables.font(font)?;
        let rarity = code.extract(layout.rarity);
        self.tables.rarity(rarity)?;
        let pupil_shape = code.extract(layout.pupil_shape);
        self.tables.pupil_sides(pupil_shape)?;

        let start_level = code.extract(layout.start_level) as u8;
        let body_outline = derive_outline(&code.digits(layout.shape));

        let scaled = |range: DigitRange, bounds: Bounds| {
            interpolate(code.extract(range), range.width(), bounds.min, bounds.max)
        };
        let line_width = scaled(layout.line_width, layout.line_width_bounds);
        let pupil_size = scaled(layout.pupil_size, layout.pupil_size_bounds);
        let eye_position = scaled(layout.eye_position, layout.eye_position_bounds);

        tracing::debug!(
            origin_code = %code,
            name = %name,
            start_level,
            rarity,
            "Generated collectible"
        );

        Ok(Collectible {
            origin_code: code,
            color,
            name,
            font: font as u8,
            rarity: rarity as u8,
            start_level,
            current_level: start_level,
            body_outline,
            line_width,
            pupil_shape: pupil_shape as u8,
            pupil_size,
            eye_position,
            first_scan_time_utc: now,
            last_scan_time_utc: now,
        })
    }
}

impl Default for CollectibleFactory {
    fn default() -> Self {
        Self {
            layout: DigitLayout::default(),
            tables: LookupTables::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::OutlinePoint;
    use crate::generation::tables::{syllabic_names, TableKind};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_factory_builds() {
        assert!(CollectibleFactory::new(DigitLayout::default(), LookupTables::builtin()).is_ok());
    }

    #[test]
    fn test_create_known_code() {
        let factory = CollectibleFactory::default();
        let critter = factory.create_at("12345678", at()).unwrap();

        assert_eq!(critter.origin_code.as_str(), "12345678");
        assert_eq!(critter.name, syllabic_names()[123]);
        assert_eq!(critter.font, 4);
        assert_eq!(critter.color, factory.tables().color(5).unwrap());
        assert_eq!(critter.rarity, 6);
        assert_eq!(critter.start_level, 78);
        assert_eq!(critter.current_level, 78);
        assert_eq!(critter.pupil_shape, 2);
        assert_eq!(critter.body_outline.len(), 5);
        assert_eq!(critter.first_scan_time_utc, at());
        assert_eq!(critter.last_scan_time_utc, at());

        // line width reads digit 3, pupil size digit 8, eye position digits 1-2
        assert!((critter.line_width - (0.2 + 0.3 * 3.0 / 9.0)).abs() < 1e-6);
        assert!((critter.pupil_size - (0.1 + 0.2 * 8.0 / 9.0)).abs() < 1e-6);
        assert!((critter.eye_position - 12.0 / 99.0).abs() < 1e-6);
    }

    #[test]
    fn test_outline_reads_shape_digits() {
        let factory = CollectibleFactory::default();
        let critter = factory.create_at("00012345", at()).unwrap();
        let expected: Vec<OutlinePoint> = derive_outline(&[1, 2, 3, 4, 5]);
        assert_eq!(critter.body_outline, expected);
    }

    #[test]
    fn test_rejects_short_text() {
        let factory = CollectibleFactory::default();
        assert_eq!(
            factory.create_at("1234", at()),
            Err(GenerationError::Rejected(RejectReason::TooShort { len: 4 }))
        );
    }

    #[test]
    fn test_lookup_defect_is_distinct() {
        // Build around validation to simulate tables shrinking after startup.
        let factory = CollectibleFactory {
            layout: DigitLayout {
                color: DigitRange::new(7, 8).unwrap(),
                ..Default::default()
            },
            tables: LookupTables::builtin(),
        };
        let err = factory.create_at("12345678", at()).unwrap_err();
        assert_eq!(
            err,
            GenerationError::Lookup(LookupError::IndexOutOfRange {
                table: TableKind::Color,
                index: 78,
                len: 10,
            })
        );
    }

    #[test]
    fn test_letters_use_placeholder() {
        let factory = CollectibleFactory::default();
        let with_letters = factory.create_at("1A34B6C8", at()).unwrap();
        let digits_only = factory.create_at("10340608", at()).unwrap();
        assert!(with_letters.same_traits(&digits_only));
    }

    proptest! {
        #[test]
        fn prop_create_is_pure(text in "[0-9]{8}") {
            let factory = CollectibleFactory::default();
            let first = factory.create_at(&text, at()).unwrap();
            let second = factory.create(&text).unwrap();
            prop_assert!(first.same_traits(&second));
            prop_assert!(first.line_width >= 0.2 && first.line_width <= 0.5);
            prop_assert!(first.pupil_size >= 0.1 && first.pupil_size <= 0.3);
            prop_assert!(first.eye_position >= 0.0 && first.eye_position <= 1.0);
        }
    }
}
