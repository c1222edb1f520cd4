//! The collectible store and its per-scan state machine.
//!
//! Each origin code is either absent or present with a level. A scan moves
//! an absent code to present at its start level; a scan on a later UTC day
//! raises the level by the increment, up to the cap. All mutation goes
//! through `&mut self`, so the read-modify-write for a code is never
//! interleaved with another write for the same code.

use super::records::{RecordStore, StoreError};
use super::sorting::{sort_collection, SortingMode};
use crate::codec::{OriginCode, RejectReason};
use crate::generation::{Collectible, CollectibleFactory, GenerationError};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Default level cap.
pub const DEFAULT_LEVEL_CAP: u8 = 100;

/// Outcome of a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// First scan of this code; the critter was created and saved.
    New(Collectible),
    /// The code was already counted today. Nothing changed.
    AlreadyScannedToday(Collectible),
    /// The code was scanned on a new day and gained levels.
    LeveledUp {
        collectible: Collectible,
        old_level: u8,
        new_level: u8,
    },
    /// The critter is at the level cap. Nothing changed.
    LevelCapped(Collectible),
    /// The barcode text was not usable.
    Rejected(RejectReason),
}

impl ScanEvent {
    /// The collectible the event refers to, if any.
    pub fn collectible(&self) -> Option<&Collectible> {
        match self {
            ScanEvent::New(c)
            | ScanEvent::AlreadyScannedToday(c)
            | ScanEvent::LevelCapped(c)
            | ScanEvent::LeveledUp { collectible: c, .. } => Some(c),
            ScanEvent::Rejected(_) => None,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanEvent::New(_) => "new",
            ScanEvent::AlreadyScannedToday(_) => "already_scanned_today",
            ScanEvent::LeveledUp { .. } => "leveled_up",
            ScanEvent::LevelCapped(_) => "level_capped",
            ScanEvent::Rejected(_) => "rejected",
        }
    }
}

/// A scan that could not be carried out.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The layout and tables disagree.
    #[error("generation failed: {0}")]
    Generation(GenerationError),
    /// A counted scan must raise the level.
    #[error("level increment must be at least 1")]
    ZeroIncrement,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the session collection and keeps it in step with the records.
pub struct CollectibleStore<R: RecordStore> {
    factory: CollectibleFactory,
    records: R,
    session: Vec<Collectible>,
    level_cap: u8,
}

impl<R: RecordStore> CollectibleStore<R> {
    /// Opens a store and loads every saved record into the session.
    pub fn open(
        factory: CollectibleFactory,
        records: R,
        level_cap: u8,
    ) -> Result<Self, StoreError> {
        let session = records.load_all()?;
        tracing::info!(count = session.len(), level_cap, "Collection loaded");
        Ok(Self {
            factory,
            records,
            session,
            level_cap,
        })
    }

    pub fn level_cap(&self) -> u8 {
        self.level_cap
    }

    pub fn factory(&self) -> &CollectibleFactory {
        &self.factory
    }

    /// Session collection in the order it was loaded or created.
    pub fn collection(&self) -> &[Collectible] {
        &self.session
    }

    /// Session collection ordered by `mode`.
    pub fn sorted(&self, mode: SortingMode) -> Vec<&Collectible> {
        sort_collection(&self.session, mode)
    }

    pub fn get(&self, code: &OriginCode) -> Option<&Collectible> {
        self.session.iter().find(|c| &c.origin_code == code)
    }

    /// Records a scan at the current time.
    pub fn scan(&mut self, barcode_text: &str, increment: u32) -> Result<ScanEvent, ScanError> {
        self.scan_at(barcode_text, increment, Utc::now())
    }

    /// Records a scan at `now`.
    pub fn scan_at(
        &mut self,
        barcode_text: &str,
        increment: u32,
        now: DateTime<Utc>,
    ) -> Result<ScanEvent, ScanError> {
        if increment == 0 {
            return Err(ScanError::ZeroIncrement);
        }
        let code = match OriginCode::normalize(barcode_text) {
            Ok(code) => code,
            Err(reason) => {
                tracing::info!(%reason, "Barcode rejected");
                return Ok(ScanEvent::Rejected(reason));
            }
        };

        let existing = match self.get(&code) {
            Some(c) => Some(c.clone()),
            None => self.records.load(&code)?,
        };

        let Some(mut collectible) = existing else {
            return self.create(code, now);
        };

        if collectible.scanned_on_same_day(now) {
            tracing::debug!(origin_code = %code, "Already scanned today");
            return Ok(ScanEvent::AlreadyScannedToday(collectible));
        }

        let old_level = collectible.current_level;
        if old_level >= self.level_cap {
            tracing::debug!(origin_code = %code, level = old_level, "Level cap reached");
            return Ok(ScanEvent::LevelCapped(collectible));
        }

        let raised = u32::from(old_level).saturating_add(increment);
        let new_level = raised.min(u32::from(self.level_cap)) as u8;
        collectible.current_level = new_level;
        collectible.last_scan_time_utc = now;

        self.records.save(&collectible)?;
        self.remember(collectible.clone());

        tracing::info!(origin_code = %code, old_level, new_level, "Collectible leveled up");
        Ok(ScanEvent::LeveledUp {
            collectible,
            old_level,
            new_level,
        })
    }

    fn create(&mut self, code: OriginCode, now: DateTime<Utc>) -> Result<ScanEvent, ScanError> {
        let collectible = match self.factory.create_from_code(code, now) {
            Ok(c) => c,
            Err(GenerationError::Rejected(reason)) => return Ok(ScanEvent::Rejected(reason)),
            Err(e) => {
                tracing::error!(origin_code = %code, error = %e, "Collectible generation failed");
                return Err(ScanError::Generation(e));
            }
        };

        self.records.save(&collectible)?;
        self.remember(collectible.clone());

        tracing::info!(
            origin_code = %code,
            name = %collectible.name,
            level = collectible.current_level,
            "New collectible"
        );
        Ok(ScanEvent::New(collectible))
    }

    /// Replaces or appends the session entry for a saved record.
    fn remember(&mut self, collectible: Collectible) {
        match self
            .session
            .iter_mut()
            .find(|c| c.origin_code == collectible.origin_code)
        {
            Some(slot) => *slot = collectible,
            None => self.session.push(collectible),
        }
    }

    /// Deletes every record and clears the session.
    pub fn erase_all(&mut self) -> Result<usize, StoreError> {
        let deleted = self.records.erase_all()?;
        self.session.clear();
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::records::MemoryRecords;
    use chrono::{Duration, TimeZone};
    use std::path::PathBuf;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap() + Duration::days(n)
    }

    fn store() -> CollectibleStore<MemoryRecords> {
        CollectibleStore::open(
            CollectibleFactory::default(),
            MemoryRecords::new(),
            DEFAULT_LEVEL_CAP,
        )
        .unwrap()
    }

    #[test]
    fn test_first_scan_is_new() {
        let mut store = store();
        let event = store.scan_at("12345678", 1, day(0)).unwrap();
        match event {
            ScanEvent::New(c) => {
                assert_eq!(c.current_level, c.start_level);
                assert_eq!(c.current_level, 78);
            }
            other => panic!("expected New, got {other:?}"),
        }
        assert_eq!(store.collection().len(), 1);
    }

    #[test]
    fn test_level_progression_to_cap() {
        let mut store = store();
        // start level is the last two digits
        assert!(matches!(
            store.scan_at("12345610", 3, day(0)).unwrap(),
            ScanEvent::New(_)
        ));

        let again = store.scan_at("12345610", 3, day(0)).unwrap();
        match again {
            ScanEvent::AlreadyScannedToday(c) => assert_eq!(c.current_level, 10),
            other => panic!("expected AlreadyScannedToday, got {other:?}"),
        }

        let next = store.scan_at("12345610", 3, day(1)).unwrap();
        assert!(matches!(
            next,
            ScanEvent::LeveledUp {
                old_level: 10,
                new_level: 13,
                ..
            }
        ));

        let mut d = 2;
        loop {
            match store.scan_at("12345610", 3, day(d)).unwrap() {
                ScanEvent::LeveledUp { new_level, .. } if new_level == DEFAULT_LEVEL_CAP => break,
                ScanEvent::LeveledUp { .. } => d += 1,
                other => panic!("unexpected {other:?}"),
            }
        }

        let capped = store.scan_at("12345610", 3, day(d + 1)).unwrap();
        match capped {
            ScanEvent::LevelCapped(c) => assert_eq!(c.current_level, DEFAULT_LEVEL_CAP),
            other => panic!("expected LevelCapped, got {other:?}"),
        }
        let code = OriginCode::normalize("12345610").unwrap();
        assert_eq!(store.get(&code).unwrap().current_level, DEFAULT_LEVEL_CAP);
    }

    #[test]
    fn test_same_day_check_wins_over_cap() {
        let mut store = CollectibleStore::open(
            CollectibleFactory::default(),
            MemoryRecords::new(),
            10,
        )
        .unwrap();
        store.scan_at("12345610", 1, day(0)).unwrap();
        assert!(matches!(
            store.scan_at("12345610", 1, day(0)).unwrap(),
            ScanEvent::AlreadyScannedToday(_)
        ));
        assert!(matches!(
            store.scan_at("12345610", 1, day(1)).unwrap(),
            ScanEvent::LevelCapped(_)
        ));
    }

    #[test]
    fn test_zero_increment_is_refused() {
        let mut store = store();
        store.scan_at("12345610", 1, day(0)).unwrap();
        assert!(matches!(
            store.scan_at("12345610", 0, day(1)),
            Err(ScanError::ZeroIncrement)
        ));
        // the next day's scan is still available
        assert!(matches!(
            store.scan_at("12345610", 1, day(1)).unwrap(),
            ScanEvent::LeveledUp {
                old_level: 10,
                new_level: 11,
                ..
            }
        ));
    }

    #[test]
    fn test_leading_zero_codes_are_kept() {
        let mut store = store();
        let event = store.scan_at("00000042", 1, day(0)).unwrap();
        let critter = event.collectible().unwrap();
        assert_eq!(critter.origin_code.as_str(), "00000042");
        assert_eq!(critter.body_outline.len(), 5);
    }

    #[test]
    fn test_rejected_text_does_not_mutate() {
        let mut store = store();
        assert_eq!(
            store.scan_at("123", 1, day(0)).unwrap(),
            ScanEvent::Rejected(RejectReason::TooShort { len: 3 })
        );
        assert!(store.collection().is_empty());
    }

    #[test]
    fn test_erase_all_clears_session() {
        let mut store = store();
        store.scan_at("11111111", 1, day(0)).unwrap();
        store.scan_at("22222222", 1, day(0)).unwrap();
        assert_eq!(store.erase_all().unwrap(), 2);
        assert!(store.collection().is_empty());
        assert!(matches!(
            store.scan_at("11111111", 1, day(1)).unwrap(),
            ScanEvent::New(_)
        ));
    }

    /// Backend whose writes can be switched off.
    #[derive(Default)]
    struct FlakyRecords {
        inner: MemoryRecords,
        fail_writes: bool,
    }

    impl RecordStore for FlakyRecords {
        fn load(&self, code: &OriginCode) -> Result<Option<Collectible>, StoreError> {
            self.inner.load(code)
        }

        fn save(&mut self, collectible: &Collectible) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Io {
                    path: PathBuf::from(format!("{}.json", collectible.origin_code)),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.inner.save(collectible)
        }

        fn load_all(&self) -> Result<Vec<Collectible>, StoreError> {
            self.inner.load_all()
        }

        fn erase_all(&mut self) -> Result<usize, StoreError> {
            self.inner.erase_all()
        }
    }

    #[test]
    fn test_failed_write_leaves_session_unchanged() {
        let mut store =
            CollectibleStore::open(CollectibleFactory::default(), FlakyRecords::default(), 100)
                .unwrap();
        store.scan_at("12345610", 5, day(0)).unwrap();

        store.records.fail_writes = true;
        let result = store.scan_at("12345610", 5, day(1));
        assert!(matches!(result, Err(ScanError::Store(_))));

        let code = OriginCode::normalize("12345610").unwrap();
        let kept = store.get(&code).unwrap();
        assert_eq!(kept.current_level, 10);
        assert_eq!(kept.last_scan_time_utc, day(0));

        let fresh = store.scan_at("87654321", 5, day(1));
        assert!(fresh.is_err());
        assert_eq!(store.collection().len(), 1);
    }

    #[test]
    fn test_open_reloads_saved_records() {
        let mut records = MemoryRecords::new();
        let factory = CollectibleFactory::default();
        records
            .save(&factory.create_at("33333333", day(0)).unwrap())
            .unwrap();

        let store = CollectibleStore::open(factory, records, 100).unwrap();
        assert_eq!(store.collection().len(), 1);
    }
}
