//! Integration tests: run the sync-function fixture vectors.
//!
//! Each fixture in tests/fixtures/ has:
//! - case.json: policy, principal, new revision, optional old revision
//! - expect.json: either the accepted outcome or the rejection kind/message
//!
//! Accepted outcomes are compared in full, including the grants and channel
//! assignment recorded by the in-memory host.

use serde_json::{Value, json};
use std::path::PathBuf;
use syncgate_kernel::{Document, MemoryHost, Principal, SyncPolicy};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_json(path: &PathBuf) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);
    let case = read_json(&dir.join("case.json"));
    let expected = read_json(&dir.join("expect.json"));

    let policy = SyncPolicy::from_json_str(&case["policy"].to_string())
        .unwrap_or_else(|e| panic!("bad policy in {name}: {e}"));
    let principal: Principal =
        serde_json::from_value(case["principal"].clone()).expect("principal should parse");
    let new: Document = serde_json::from_value(case["new"].clone()).expect("new should parse");
    let old: Option<Document> = case
        .get("old")
        .map(|old| serde_json::from_value(old.clone()).expect("old should parse"));

    let mut host = MemoryHost::new(principal);
    let actual = match policy.sync(&mut host, &new, old.as_ref()) {
        Ok(outcome) => {
            // The host must have seen exactly what the outcome reports.
            assert_eq!(host.grants(), outcome.emission.grants.as_slice());
            assert_eq!(host.assigned_channels(), outcome.emission.channels.as_slice());
            json!({"accepted": true, "outcome": outcome})
        }
        Err(err) => {
            assert!(host.grants().is_empty(), "{name}: grants leaked on rejection");
            assert!(
                host.assigned_channels().is_empty(),
                "{name}: channels leaked on rejection"
            );
            json!({"accepted": false, "kind": err.kind(), "message": err.to_string()})
        }
    };

    assert_eq!(
        actual,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&actual).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn post_create_by_author() {
    run_fixture("post_create_by_author");
}

#[test]
fn post_create_without_role() {
    run_fixture("post_create_without_role");
}

#[test]
fn create_unregistered_type() {
    run_fixture("create_unregistered_type");
}

#[test]
fn profile_email_change_by_owner() {
    run_fixture("profile_email_change_by_owner");
}

#[test]
fn profile_email_change_by_other() {
    run_fixture("profile_email_change_by_other");
}

#[test]
fn profile_name_change_by_other() {
    run_fixture("profile_name_change_by_other");
}

#[test]
fn access_type_grants_doc_channel() {
    run_fixture("access_type_grants_doc_channel");
}

#[test]
fn owner_required_but_missing() {
    run_fixture("owner_required_but_missing");
}

#[test]
fn delete_of_nonexistent() {
    run_fixture("delete_of_nonexistent");
}

#[test]
fn delete_by_owner_without_channel_access() {
    run_fixture("delete_by_owner_without_channel_access");
}

#[test]
fn update_changing_type() {
    run_fixture("update_changing_type");
}

#[test]
fn update_dropping_type() {
    run_fixture("update_dropping_type");
}

#[test]
fn every_fixture_has_a_test() {
    let mut names: Vec<String> = std::fs::read_dir(fixtures_dir())
        .expect("fixtures dir should exist")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "access_type_grants_doc_channel",
            "create_unregistered_type",
            "delete_by_owner_without_channel_access",
            "delete_of_nonexistent",
            "owner_required_but_missing",
            "post_create_by_author",
            "post_create_without_role",
            "profile_email_change_by_other",
            "profile_email_change_by_owner",
            "profile_name_change_by_other",
            "update_changing_type",
            "update_dropping_type",
        ]
    );
}
