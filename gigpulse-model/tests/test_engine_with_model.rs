use chrono::{Duration, NaiveDate};
use gigpulse_core::{AreaRegistry, BlendMode, ConsentSet, Engine, MemoryShiftStore};
use gigpulse_ingest::{parse_consent_csv, parse_shifts_csv};
use gigpulse_model::{ModelPaths, TreePredictor};
use std::path::PathBuf;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("data")
}

fn today() -> NaiveDate {
    // Friday after the fixture Monday (2026-03-16)
    NaiveDate::from_ymd_opt(2026, 3, 20).unwrap()
}

fn load() -> (AreaRegistry, MemoryShiftStore, ConsentSet) {
    let import = parse_shifts_csv(data_dir().join("shifts.csv")).unwrap();
    let consent = parse_consent_csv(data_dir().join("consent.csv")).unwrap();
    (
        AreaRegistry::builtin(),
        MemoryShiftStore::new(import.records),
        consent,
    )
}

#[test]
fn test_fixture_import() {
    let import = parse_shifts_csv(data_dir().join("shifts.csv")).unwrap();
    assert_eq!(import.records.len(), 8);
    assert_eq!(import.skipped.len(), 1);
    assert_eq!(import.skipped[0].line, 10);

    let consent = parse_consent_csv(data_dir().join("consent.csv")).unwrap();
    assert_eq!(consent.opted_in_count(), 2);
}

#[test]
fn test_base_ranking_monday_evening() {
    let (areas, store, consent) = load();
    let engine = Engine::new(&areas, &store, &consent, today());

    let rows = engine.ranking(0, 18, BlendMode::Base);
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0].area_slug, "shinjuku");
    assert_eq!(rows[0].hourly, 2167.0);
    assert_eq!(rows[0].samples_h, 1.0);
    // opted-out ginza evidence never reaches the prior
    assert!(rows[1..7].iter().all(|r| r.hourly == 2000.0 && r.samples_h == 0.0));
    assert_eq!(rows[7].area_slug, "shibuya");
    assert_eq!(rows[7].hourly, 1833.0);
}

#[test]
fn test_blend_and_model_modes() {
    let (areas, store, consent) = load();
    let model = TreePredictor::new(ModelPaths::in_dir(&data_dir()));
    let engine = Engine::new(&areas, &store, &consent, today()).with_model(&model);

    let blended = engine.ranking(0, 18, BlendMode::Blend);
    assert_eq!(blended[0].area_slug, "ginza");
    assert_eq!(blended[0].hourly, 2560.0);
    let shinjuku = blended.iter().find(|r| r.area_slug == "shinjuku").unwrap();
    assert_eq!(shinjuku.hourly, 1922.0);
    assert_eq!(shinjuku.samples_h, 1.0);

    let ml = engine.ranking(0, 18, BlendMode::Ml);
    assert_eq!(ml[0].area_slug, "ginza");
    assert_eq!(ml[0].hourly, 2700.0);
    assert!(ml.iter().all(|r| r.samples_h == 0.0));
    assert!(ml[1..].iter().all(|r| r.hourly == 1800.0));
    // ties keep catalog order
    assert_eq!(ml[1].area_slug, "shibuya");
}

#[test]
fn test_missing_model_falls_back_to_base() {
    let (areas, store, consent) = load();
    let empty = tempfile::tempdir().unwrap();
    let model = TreePredictor::new(ModelPaths::in_dir(empty.path()));
    let engine = Engine::new(&areas, &store, &consent, today()).with_model(&model);

    assert_eq!(
        engine.ranking(0, 18, BlendMode::Blend),
        engine.ranking(0, 18, BlendMode::Base)
    );
    assert_eq!(
        engine.ranking(0, 18, BlendMode::Ml),
        engine.ranking(0, 18, BlendMode::Base)
    );
}

#[test]
fn test_plan_evening() {
    let (areas, store, consent) = load();
    let model = TreePredictor::new(ModelPaths::in_dir(&data_dir()));
    let engine = Engine::new(&areas, &store, &consent, today()).with_model(&model);
    let start = NaiveDate::from_ymd_opt(2026, 3, 23)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();

    let base = engine.plan_report(start, 2, 120.0, BlendMode::Base);
    assert_eq!(base.len(), 1);
    assert_eq!(base[0].area_slug, "shinjuku");
    assert_eq!(base[0].time_range, "18:00-20:00");
    assert_eq!(base[0].expected_hourly, 2167.0);
    assert_eq!(base[0].samples_h, 2.0);

    let blocks = engine.plan(start, 3, 120.0, BlendMode::Blend);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].area, "ginza");
    assert_eq!(blocks[0].end, start + Duration::hours(3));
    assert!((blocks[0].expected_hourly - (2560.0 + 2560.0 + 2660.0) / 3.0).abs() < 1e-9);
}
