//! Critter generation.
//!
//! Maps an origin code onto a complete [`Collectible`]: digit windows from
//! the [`DigitLayout`] pick entries out of the [`LookupTables`], drive the
//! outline shuffle, and are interpolated into display ranges.

mod collectible;
mod factory;
mod layout;
mod tables;

pub use collectible::{Collectible, Rgb};
pub use factory::{CollectibleFactory, GenerationError};
pub use layout::{Attribute, Bounds, DigitLayout, LayoutError};
pub use tables::{
    clean_raw_names, load_names, parse_names, syllabic_names, FontOption, LookupError,
    LookupTables, TableKind,
};
