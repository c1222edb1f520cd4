//! Lookup tables that digit windows index into.
//!
//! Tables are plain ordered lists. An index past the end of a table is a
//! mismatch between the digit layout and the bundled data, so it is
//! reported as [`LookupError::IndexOutOfRange`] and never clamped.

use super::collectible::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Identifies one of the lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Name,
    Color,
    Font,
    PupilSides,
    Rarity,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TableKind::Name => "name",
            TableKind::Color => "color",
            TableKind::Font => "font",
            TableKind::PupilSides => "pupil side",
            TableKind::Rarity => "rarity",
        };
        f.write_str(label)
    }
}

/// Lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("{table} index {index} out of range (table has {len} entries)")]
    IndexOutOfRange {
        table: TableKind,
        index: u32,
        len: usize,
    },
    #[error("failed to read {table} table from {path}: {message}")]
    Load {
        table: TableKind,
        path: String,
        message: String,
    },
}

/// A font asset descriptor. The asset itself lives with the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontOption {
    pub name: String,
    pub relative_size: f32,
}

impl FontOption {
    pub fn new(name: impl Into<String>, relative_size: f32) -> Self {
        Self {
            name: name.into(),
            relative_size,
        }
    }
}

/// All tables a critter is resolved against.
#[derive(Debug, Clone)]
pub struct LookupTables {
    names: Vec<String>,
    colors: Vec<Rgb>,
    fonts: Vec<FontOption>,
    pupil_sides: Vec<u32>,
    rarities: Vec<String>,
}

const FIRST_SYLLABLES: [&str; 10] = ["Bo", "Fi", "Ka", "Lu", "Mo", "Pi", "Ru", "Sa", "Te", "Zu"];
const MIDDLE_SYLLABLES: [&str; 10] = ["ba", "di", "go", "ki", "la", "mu", "no", "pe", "ri", "to"];
const LAST_SYLLABLES: [&str; 10] = [
    "bert", "dle", "fin", "gus", "lix", "mo", "nik", "pip", "sy", "x",
];

/// Builds the bundled 1000-entry name table.
///
/// Entry `i` is made of the hundreds, tens and ones digits of `i`, one
/// syllable each, so every index has a distinct name.
pub fn syllabic_names() -> Vec<String> {
    (0..1000usize)
        .map(|i| {
            format!(
                "{}{}{}",
                FIRST_SYLLABLES[i / 100],
                MIDDLE_SYLLABLES[(i / 10) % 10],
                LAST_SYLLABLES[i % 10]
            )
        })
        .collect()
}

/// Parses a newline-separated name list, keeping at most `max_names`.
pub fn parse_names(text: &str, max_names: usize) -> Vec<String> {
    text.split('\n')
        .map(|line| line.trim_end_matches('\r').to_owned())
        .take(max_names)
        .collect()
}

/// Extracts candidate names from raw prose separated by periods.
///
/// Fragments that are empty, span a line break, or run longer than
/// `max_chars` are dropped.
pub fn clean_raw_names(text: &str, max_chars: usize) -> Vec<String> {
    text.split('.')
        .filter(|fragment| !fragment.is_empty())
        .filter(|fragment| !fragment.contains('\n'))
        .filter(|fragment| fragment.chars().count() <= max_chars)
        .map(str::to_owned)
        .collect()
}

/// Reads a name table from disk.
pub fn load_names(path: impl AsRef<Path>, max_names: usize) -> Result<Vec<String>, LookupError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| LookupError::Load {
        table: TableKind::Name,
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let names = parse_names(&content, max_names);
    tracing::info!(path = %path.display(), count = names.len(), "Loaded name table");
    Ok(names)
}

impl LookupTables {
    pub fn new(
        names: Vec<String>,
        colors: Vec<Rgb>,
        fonts: Vec<FontOption>,
        pupil_sides: Vec<u32>,
        rarities: Vec<String>,
    ) -> Self {
        Self {
            names,
            colors,
            fonts,
            pupil_sides,
            rarities,
        }
    }

    /// The tables shipped with the crate.
    pub fn builtin() -> Self {
        let colors = vec![
            Rgb::new(0x1F, 0x5F, 0xBF),
            Rgb::new(0xE6, 0x3B, 0x2E),
            Rgb::new(0x2E, 0x9E, 0x5B),
            Rgb::new(0xF2, 0xC1, 0x2E),
            Rgb::new(0x8E, 0x44, 0xAD),
            Rgb::new(0xF3, 0x9C, 0x12),
            Rgb::new(0x16, 0xA0, 0x85),
            Rgb::new(0xD3, 0x54, 0x9A),
            Rgb::new(0x34, 0x49, 0x5E),
            Rgb::new(0x7F, 0x8C, 0x8D),
        ];
        let fonts = vec![
            FontOption::new("Rounded", 1.0),
            FontOption::new("Mono", 0.85),
            FontOption::new("Serif", 0.95),
            FontOption::new("Condensed", 1.1),
            FontOption::new("Script", 0.9),
            FontOption::new("Stencil", 1.0),
            FontOption::new("Pixel", 0.8),
            FontOption::new("Slab", 0.95),
            FontOption::new("Hand", 1.05),
            FontOption::new("Display", 1.2),
        ];
        let rarities = [
            "Common", "Common", "Common", "Common", "Uncommon", "Uncommon", "Uncommon", "Rare",
            "Epic", "Legendary",
        ]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();

        Self::new(
            syllabic_names(),
            colors,
            fonts,
            vec![3, 4, 5, 6, 7, 8, 9, 10, 12, 32],
            rarities,
        )
    }

    /// Replaces the name table.
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    /// Number of entries in a table.
    pub fn len(&self, table: TableKind) -> usize {
        match table {
            TableKind::Name => self.names.len(),
            TableKind::Color => self.colors.len(),
            TableKind::Font => self.fonts.len(),
            TableKind::PupilSides => self.pupil_sides.len(),
            TableKind::Rarity => self.rarities.len(),
        }
    }

    pub fn name(&self, index: u32) -> Result<&str, LookupError> {
        lookup(&self.names, TableKind::Name, index).map(String::as_str)
    }

    pub fn color(&self, index: u32) -> Result<Rgb, LookupError> {
        lookup(&self.colors, TableKind::Color, index).copied()
    }

    pub fn font(&self, index: u32) -> Result<&FontOption, LookupError> {
        lookup(&self.fonts, TableKind::Font, index)
    }

    /// Number of polygon sides for a pupil shape index.
    pub fn pupil_sides(&self, index: u32) -> Result<u32, LookupError> {
        lookup(&self.pupil_sides, TableKind::PupilSides, index).copied()
    }

    pub fn rarity(&self, index: u32) -> Result<&str, LookupError> {
        lookup(&self.rarities, TableKind::Rarity, index).map(String::as_str)
    }
}

impl Default for LookupTables {
    fn default() -> Self {
        Self::builtin()
    }
}

fn lookup<T>(table: &[T], kind: TableKind, index: u32) -> Result<&T, LookupError> {
    table
        .get(index as usize)
        .ok_or(LookupError::IndexOutOfRange {
            table: kind,
            index,
            len: table.len(),
        })
}
