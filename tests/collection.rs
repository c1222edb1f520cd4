//! End-to-end collection behaviour against the on-disk record store.

use bike_critters::store::{
    CollectibleStore, JsonDirectory, ScanEvent, SettingsFile, SortingMode, UserSettings,
    SETTINGS_FILE_NAME,
};
use bike_critters::{AppConfig, CollectibleFactory, OriginCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::fs;

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 23, 59, 0).unwrap() + Duration::days(n)
}

fn open(dir: &std::path::Path) -> CollectibleStore<JsonDirectory> {
    CollectibleStore::open(
        CollectibleFactory::default(),
        JsonDirectory::open(dir).unwrap(),
        100,
    )
    .unwrap()
}

#[test]
fn scan_scenario_survives_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let code = OriginCode::normalize("12345610").unwrap();

    {
        let mut store = open(dir.path());
        assert!(matches!(
            store.scan_at("12345610", 3, day(0)).unwrap(),
            ScanEvent::New(_)
        ));
    }
    assert!(dir.path().join("12345610.json").exists());

    // a minute later is the next UTC day
    {
        let mut store = open(dir.path());
        assert_eq!(store.collection().len(), 1);
        let event = store
            .scan_at("12345610", 3, day(0) + Duration::minutes(2))
            .unwrap();
        assert!(matches!(
            event,
            ScanEvent::LeveledUp {
                old_level: 10,
                new_level: 13,
                ..
            }
        ));
        assert!(matches!(
            store
                .scan_at("12345610", 3, day(1) - Duration::minutes(1))
                .unwrap(),
            ScanEvent::AlreadyScannedToday(_)
        ));
    }

    let mut store = open(dir.path());
    assert_eq!(store.get(&code).unwrap().current_level, 13);

    let mut n = 2;
    while store.get(&code).unwrap().current_level < 100 {
        store.scan_at("12345610", 3, day(n)).unwrap();
        n += 1;
    }
    assert!(matches!(
        store.scan_at("12345610", 3, day(n)).unwrap(),
        ScanEvent::LevelCapped(_)
    ));
    assert_eq!(open(dir.path()).get(&code).unwrap().current_level, 100);
}

#[test]
fn record_json_uses_camel_case_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    store.scan_at("00000042", 1, day(0)).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("00000042.json")).unwrap())
            .unwrap();
    assert_eq!(raw["originCode"], "00000042");
    assert_eq!(raw["startLevel"], 42);
    assert_eq!(raw["currentLevel"], 42);
    assert_eq!(raw["bodyOutline"].as_array().unwrap().len(), 5);
    assert!(raw["firstScanTimeUtc"].is_string());
}

#[test]
fn erase_keeps_settings() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings =
        SettingsFile::open(dir.path().join(SETTINGS_FILE_NAME), UserSettings::default()).unwrap();
    settings.set_sorting_mode(SortingMode::LevelUp).unwrap();

    let mut store = open(dir.path());
    for code in ["11111111", "22222222", "33333333"] {
        store.scan_at(code, 1, day(0)).unwrap();
    }
    assert_eq!(store.erase_all().unwrap(), 3);
    assert!(open(dir.path()).collection().is_empty());

    let reopened =
        SettingsFile::open(dir.path().join(SETTINGS_FILE_NAME), UserSettings::default()).unwrap();
    assert_eq!(reopened.settings().sorting(), SortingMode::LevelUp);
}

#[test]
fn sorted_listing_by_level() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    for code in ["10000050", "20000007", "30000099"] {
        store.scan_at(code, 1, day(0)).unwrap();
    }
    let levels: Vec<u8> = store
        .sorted(SortingMode::LevelUp)
        .iter()
        .map(|c| c.current_level)
        .collect();
    assert_eq!(levels, vec![99, 50, 7]);
}

#[test]
fn config_drives_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::from_toml(&format!(
        "[store]\ndata_dir = {:?}\nlevel_increment = 5\n",
        dir.path().display().to_string()
    ))
    .unwrap();

    let mut store = CollectibleStore::open(
        config.factory().unwrap(),
        JsonDirectory::open(&config.store.data_dir).unwrap(),
        config.store.level_cap,
    )
    .unwrap();
    store.scan_at("12345610", config.store.level_increment, day(0)).unwrap();
    let event = store
        .scan_at("12345610", config.store.level_increment, day(1))
        .unwrap();
    assert!(matches!(
        event,
        ScanEvent::LeveledUp {
            old_level: 10,
            new_level: 15,
            ..
        }
    ));
}
