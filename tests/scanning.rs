//! Scanner pipeline scenarios: noisy readings in, one store event out.

use bike_critters::scanner::{
    BarcodeDecoder, BarcodeFormat, DebounceConfig, DebounceState, Decoded, Frame, NoiseProfile,
    NoisyDecoder, ScanDebouncer, ScriptedDecoder,
};
use bike_critters::store::{CollectibleStore, MemoryRecords, ScanEvent};
use bike_critters::{CollectibleFactory, ScanPipeline};
use chrono::{TimeZone, Utc};
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(40);

#[test]
fn majority_of_ten_frames() {
    let mut decoder = ScriptedDecoder::new(
        [
            "10000123", "10000123", "10000999", "10000123", "10000123", "10000123", "10000999",
            "10000123", "10000123", "10000123",
        ]
        .map(Some),
    );
    let mut debouncer = ScanDebouncer::default();
    let blank = Frame::gray(vec![0; 4], 2, 2, 0);

    let mut emitted = Vec::new();
    for _ in 0..10 {
        let reading = decoder.decode(&blank);
        emitted.extend(debouncer.step(reading.as_ref().map(|d| d.text.as_str()), FRAME));
    }
    emitted.extend(debouncer.advance(Duration::from_secs(1)));

    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].text, "10000123");
    assert_eq!(emitted[0].votes, 8);
}

#[test]
fn searching_has_no_timer() {
    let mut debouncer = ScanDebouncer::default();
    for _ in 0..500 {
        debouncer.step(None, Duration::from_secs(60));
        debouncer.step(Some("short"), Duration::from_secs(60));
    }
    assert_eq!(debouncer.state(), DebounceState::Searching);
}

#[test]
fn noisy_stream_still_creates_the_right_critter() {
    let store =
        CollectibleStore::open(CollectibleFactory::default(), MemoryRecords::new(), 100).unwrap();
    let mut pipeline = ScanPipeline::new(
        ScanDebouncer::new(DebounceConfig {
            scan_length_secs: 2.0,
            cooldown_secs: 3.0,
            ..Default::default()
        }),
        store,
        1,
    );
    let noise = NoiseProfile {
        miss_rate: 0.3,
        corrupt_rate: 0.15,
        truncate_rate: 0.1,
    };
    let mut decoder = NoisyDecoder::new("20480512", noise, 2024);
    let now = Utc.with_ymd_and_hms(2024, 4, 2, 17, 0, 0).unwrap();

    let mut events = Vec::new();
    for seq in 0..200 {
        let frame = Frame::gray(vec![0; 4], 2, 2, seq);
        let reading: Option<Decoded> = decoder.decode(&frame);
        events.extend(pipeline.on_frame_at(reading.as_ref(), FRAME, now));
    }

    let created: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::New(c) => Some(c.origin_code.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(created, vec!["20480512".to_string()]);
    assert!(events
        .iter()
        .skip(1)
        .all(|e| matches!(e, ScanEvent::AlreadyScannedToday(_))));
}

#[test]
fn disabled_scanning_ignores_everything() {
    let store =
        CollectibleStore::open(CollectibleFactory::default(), MemoryRecords::new(), 100).unwrap();
    let mut pipeline = ScanPipeline::new(ScanDebouncer::default(), store, 1);
    pipeline.debouncer_mut().set_scanning_enabled(false);

    let reading = Decoded::new("12345678", BarcodeFormat::Ean8);
    for _ in 0..100 {
        assert!(pipeline.on_frame(Some(&reading), FRAME).is_none());
    }
    assert!(pipeline.store().collection().is_empty());
}
