mod common;

use std::collections::BTreeMap;

use assert_cmd::Command;
use chrono::Utc;
use intake_core::SubmissionStore;
use intake_domain::{FieldValue, SectionData, SubmissionDocument};
use intake_storage_json::JsonSubmissionStore;
use predicates::prelude::*;
use predicates::str::contains;

fn seed(home: &std::path::Path, name: &str) -> String {
    let store = JsonSubmissionStore::in_data_dir(&home.join("data")).expect("store");
    let mut contact = SectionData::new();
    contact.insert("name".into(), FieldValue::text(name));
    contact.insert("email".into(), FieldValue::text("lead@example.edu"));
    let document = SubmissionDocument {
        contact,
        request: BTreeMap::new(),
        items: vec![SectionData::new(), SectionData::new()],
        submitted_at: Utc::now(),
    };
    store.insert(&document).expect("insert").to_string()
}

#[test]
fn version_prints_build_metadata() {
    Command::cargo_bin("lab_intake")
        .expect("binary exists")
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(concat!("lab_intake ", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn schema_lists_pages_in_order() {
    let output = Command::cargo_bin("lab_intake")
        .expect("binary exists")
        .arg("schema")
        .output()
        .expect("run schema");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let contact = stdout.find("Contact Information").expect("contact");
    let course = stdout.find("Course Details").expect("course");
    let lab = stdout.find("Lab Request Details").expect("lab");
    let hardware = stdout.find("Hardware Requirements").expect("hardware");
    assert!(contact < course && course < lab && lab < hardware);
    assert!(stdout.contains("Number of Labs [lab_count]: integer 1..=25"));
}

#[test]
fn list_on_empty_data_dir_says_so() {
    let home = common::temp_home();
    common::lab_intake(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No submissions stored yet."));
}

#[test]
fn list_shows_stored_submissions() {
    let home = common::temp_home();
    seed(&home, "Katherine Johnson");

    common::lab_intake(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Katherine Johnson <lead@example.edu>").and(contains("2 lab(s)")));
}

#[test]
fn show_accepts_an_id_prefix() {
    let home = common::temp_home();
    let id = seed(&home, "Dorothy Vaughan");

    common::lab_intake(&home)
        .args(["show", &id[..8]])
        .assert()
        .success()
        .stdout(contains("\"name\": \"Dorothy Vaughan\"").and(contains(id.as_str())));
}

#[test]
fn unknown_command_fails_with_usage() {
    Command::cargo_bin("lab_intake")
        .expect("binary exists")
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(contains("Error: unknown command `frobnicate`"));
}

#[test]
fn show_unknown_id_fails() {
    let home = common::temp_home();
    common::lab_intake(&home)
        .args(["show", "deadbeef"])
        .assert()
        .failure()
        .stderr(contains("Submission not found"));
}
