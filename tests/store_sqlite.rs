// tests/store_sqlite.rs
//
// Store behavior against a real database file.

use aisubscalp::{Deal, DealStore, PromoType, Verification};
use chrono::{TimeZone, Utc};

fn deal(app: &str) -> Deal {
    Deal {
        app_name: app.into(),
        website_url: format!("https://{}.example", app.to_lowercase()),
        promo_type: PromoType::HundredPercentOff,
        trial_length: None,
        requirements: None,
        promo_code: Some("SPRING100".into()),
        source_urls: vec![
            format!("https://news.example/{app}"),
            format!("https://{}.example/promo", app.to_lowercase()),
        ],
        date_found: Utc.with_ymd_and_hms(2025, 4, 20, 9, 30, 0).unwrap(),
        category: "Writing".into(),
        notes: format!("hackernews: {app}"),
        verification: Verification::Verified,
    }
}

#[test]
fn upserting_twice_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deals.db");
    let mut store = DealStore::open(&path).unwrap();

    let d = deal("Quill");
    assert_eq!(store.upsert(&[d.clone()]).unwrap(), 1);
    let before = store.fetch_all().unwrap();
    store.upsert(&[d.clone()]).unwrap();

    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.fetch_all().unwrap(), before);
    assert_eq!(before, vec![d]);
}

#[test]
fn conflict_updates_mutable_fields_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DealStore::open(&dir.path().join("deals.db")).unwrap();

    store.upsert(&[deal("Quill")]).unwrap();

    let mut newer = deal("Quill");
    newer.promo_code = Some("SUMMER100".into());
    newer.source_urls = vec!["https://quill.example/summer".into()];
    newer.date_found = newer.date_found + chrono::Duration::days(30);
    newer.verification = Verification::unverified("Verification keywords missing");
    store.upsert(&[newer.clone()]).unwrap();

    let rows = store.fetch_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], newer);
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deals.db");
    {
        let mut store = DealStore::open(&path).unwrap();
        let mut trial = deal("Quill");
        trial.promo_type = PromoType::FreeTrial;
        trial.trial_length = Some("7 day".into());
        trial.promo_code = None;
        store.upsert(&[deal("Quill"), trial, deal("Brush")]).unwrap();
    }
    let store = DealStore::open(&path).unwrap();
    assert_eq!(store.count().unwrap(), 3);
    let types: Vec<String> = store
        .fetch_all()
        .unwrap()
        .iter()
        .map(|d| d.promo_type.label().to_string())
        .collect();
    // equal dates: insertion order
    assert_eq!(types, vec!["100% Off", "Free Trial", "100% Off"]);
}

#[test]
fn unknown_promo_labels_round_trip() {
    let mut store = DealStore::open_in_memory().unwrap();
    let mut d = deal("Echo");
    d.promo_type = PromoType::Other("Lifetime Deal".into());
    store.upsert(&[d.clone()]).unwrap();
    assert_eq!(store.fetch_all().unwrap(), vec![d]);
}
