//! Collection sort orders.

use crate::generation::Collectible;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How the collection is ordered for display.
///
/// The discriminants are the integers stored in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortingMode {
    /// Oldest first.
    #[default]
    TimeDown = 0,
    /// Newest first.
    TimeUp = 1,
    /// A to Z.
    NameDown = 2,
    /// Z to A.
    NameUp = 3,
    /// Lowest level first.
    LevelDown = 4,
    /// Highest level first.
    LevelUp = 5,
    /// Rarest first.
    RarityDown = 6,
    /// Most common first.
    RarityUp = 7,
    /// Ascending hue.
    ColourDown = 8,
    /// Descending hue.
    ColourUp = 9,
}

impl SortingMode {
    pub const ALL: [SortingMode; 10] = [
        SortingMode::TimeDown,
        SortingMode::TimeUp,
        SortingMode::NameDown,
        SortingMode::NameUp,
        SortingMode::LevelDown,
        SortingMode::LevelUp,
        SortingMode::RarityDown,
        SortingMode::RarityUp,
        SortingMode::ColourDown,
        SortingMode::ColourUp,
    ];

    /// Converts a stored integer, falling back to oldest-first.
    pub fn from_index(index: i32) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    /// Integer stored in the settings file.
    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortingMode::TimeDown => "time-down",
            SortingMode::TimeUp => "time-up",
            SortingMode::NameDown => "name-down",
            SortingMode::NameUp => "name-up",
            SortingMode::LevelDown => "level-down",
            SortingMode::LevelUp => "level-up",
            SortingMode::RarityDown => "rarity-down",
            SortingMode::RarityUp => "rarity-up",
            SortingMode::ColourDown => "colour-down",
            SortingMode::ColourUp => "colour-up",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let lowered = s.to_lowercase();
        Self::ALL.iter().copied().find(|m| m.as_str() == lowered)
    }

    fn compare(self, a: &Collectible, b: &Collectible) -> Ordering {
        match self {
            SortingMode::TimeDown => a.first_scan_time_utc.cmp(&b.first_scan_time_utc),
            SortingMode::TimeUp => b.first_scan_time_utc.cmp(&a.first_scan_time_utc),
            SortingMode::NameDown => a.name.cmp(&b.name),
            SortingMode::NameUp => b.name.cmp(&a.name),
            SortingMode::LevelDown => a.current_level.cmp(&b.current_level),
            SortingMode::LevelUp => b.current_level.cmp(&a.current_level),
            SortingMode::RarityDown => b.rarity.cmp(&a.rarity),
            SortingMode::RarityUp => a.rarity.cmp(&b.rarity),
            SortingMode::ColourDown => a.color.hue().total_cmp(&b.color.hue()),
            SortingMode::ColourUp => b.color.hue().total_cmp(&a.color.hue()),
        }
    }
}

/// Returns the collection ordered by `mode`. Ties keep collection order.
pub fn sort_collection(items: &[Collectible], mode: SortingMode) -> Vec<&Collectible> {
    let mut sorted: Vec<&Collectible> = items.iter().collect();
    sorted.sort_by(|a, b| mode.compare(a, b));
    sorted
}
