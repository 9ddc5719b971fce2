use std::collections::BTreeMap;
use std::fs;

use chrono::{Duration, TimeZone, Utc};
use intake_core::{StoreError, SubmissionStore};
use intake_domain::{FieldValue, SectionData, SectionId, SubmissionDocument, SubmissionId};
use intake_storage_json::JsonSubmissionStore;
use tempfile::tempdir;

fn document(name: &str, minutes: i64) -> SubmissionDocument {
    let mut contact = SectionData::new();
    contact.insert("name".into(), FieldValue::text(name));
    contact.insert("email".into(), FieldValue::text(format!("{name}@example.edu")));
    let mut hardware = SectionData::new();
    hardware.insert("total_systems".into(), FieldValue::Integer(8));
    hardware.insert("internet_access".into(), FieldValue::Boolean(true));
    let mut request = BTreeMap::new();
    request.insert(SectionId::from("hardware"), hardware);
    let mut lab = SectionData::new();
    lab.insert("lab_name".into(), FieldValue::text("Switching"));
    SubmissionDocument {
        contact,
        request,
        items: vec![lab],
        submitted_at: Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap()
            + Duration::minutes(minutes),
    }
}

#[test]
fn json_store_writes_one_file_per_submission() {
    let dir = tempdir().expect("tempdir");
    let store = JsonSubmissionStore::in_data_dir(dir.path()).expect("create store");

    let id = store.insert(&document("ada", 0)).expect("insert");

    let path = store.submission_path(&id);
    assert!(path.exists());
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    assert!(!path.with_extension("json.tmp").exists());

    let raw = fs::read_to_string(&path).expect("read document");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(json["contact"]["name"], "ada");
    assert_eq!(json["request"]["hardware"]["total_systems"], 8);
    assert_eq!(json["items"][0]["lab_name"], "Switching");
}

#[test]
fn json_store_loads_what_it_wrote() {
    let dir = tempdir().expect("tempdir");
    let store = JsonSubmissionStore::in_data_dir(dir.path()).expect("create store");
    let original = document("grace", 5);

    let id = store.insert(&original).expect("insert");
    let loaded = store.load(&id).expect("load");

    assert_eq!(loaded.id, id);
    assert_eq!(loaded.document, original);
}

#[test]
fn json_store_reports_missing_submissions() {
    let dir = tempdir().expect("tempdir");
    let store = JsonSubmissionStore::in_data_dir(dir.path()).expect("create store");

    let err = store.load(&SubmissionId::new()).expect_err("nothing stored");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn json_store_lists_newest_first_and_skips_garbage() {
    let dir = tempdir().expect("tempdir");
    let store = JsonSubmissionStore::in_data_dir(dir.path()).expect("create store");
    store.insert(&document("older", 0)).expect("insert older");
    store.insert(&document("newer", 30)).expect("insert newer");
    fs::write(store.submissions_dir().join("broken.json"), "{ not json").expect("write junk");
    fs::write(store.submissions_dir().join("README.txt"), "ignored").expect("write txt");

    let rows = store.list().expect("list");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].contact_name, "newer");
    assert_eq!(rows[1].contact_name, "older");
    assert_eq!(rows[0].item_count, 1);
}

#[test]
fn json_store_resolves_unique_prefixes() {
    let dir = tempdir().expect("tempdir");
    let store = JsonSubmissionStore::in_data_dir(dir.path()).expect("create store");
    let id = store.insert(&document("ada", 0)).expect("insert");
    let full = id.to_string();

    assert_eq!(store.resolve(&full).expect("full id"), id);
    assert_eq!(store.resolve(&full[..8]).expect("prefix"), id);
    assert!(matches!(
        store.resolve("zzzz"),
        Err(StoreError::NotFound(_))
    ));
}
