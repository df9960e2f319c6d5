//! Idempotency Contract Tests
//!
//! Verify that presenting and cleaning up the same challenge repeatedly
//! converges without duplicating or failing.
//!
//! Constraints verified:
//! - A second present for the same name overwrites the first record
//! - A second cleanup issues no write and still succeeds
//! - Cleanup of a name that never existed is success without writes
//! - Present always writes, even when the content already matches

mod common;

use common::*;
use pdd_core::{ChallengeTarget, ReconcileOutcome, Reconciler};

fn target(value: &str) -> ChallengeTarget {
    ChallengeTarget::new("example.com", "_acme-challenge", value, 300)
}

#[tokio::test]
async fn present_twice_updates_the_record_created_first() {
    let mock = MockDnsProvider::new();
    let reconciler = Reconciler::new(Box::new(mock.clone()));

    let first = reconciler.ensure_present(&target("token-1")).await.unwrap();
    let ReconcileOutcome::Created { record } = first else {
        panic!("expected Created, got {first:?}");
    };

    let second = reconciler.ensure_present(&target("token-2")).await.unwrap();
    match second {
        ReconcileOutcome::Updated {
            record: updated,
            previous_content,
        } => {
            assert_eq!(updated.record_id, record.record_id);
            assert_eq!(updated.content, "token-2");
            assert_eq!(previous_content, "token-1");
        }
        other => panic!("expected Updated, got {other:?}"),
    }

    let records = mock.records();
    assert_eq!(records.len(), 1, "no duplicate records");
    assert_eq!(records[0].content, "token-2");
}

#[tokio::test]
async fn present_with_same_content_still_writes() {
    let mock = MockDnsProvider::new().with_record(txt_record(9, "example.com", "_acme-challenge", "same"));
    let reconciler = Reconciler::new(Box::new(mock.clone()));

    let outcome = reconciler.ensure_present(&target("same")).await.unwrap();

    assert!(matches!(outcome, ReconcileOutcome::Updated { .. }));
    assert_eq!(
        mock.writes(),
        vec![Call::Update {
            record_id: 9,
            domain: "example.com".into(),
            subdomain: "_acme-challenge".into(),
            content: "same".into(),
            ttl: 300,
        }]
    );
}

#[tokio::test]
async fn cleanup_twice_writes_once() {
    let mock = MockDnsProvider::new().with_record(txt_record(3, "example.com", "_acme-challenge", "v"));
    let reconciler = Reconciler::new(Box::new(mock.clone()));

    let first = reconciler.ensure_absent("example.com", "_acme-challenge").await.unwrap();
    assert_eq!(first, ReconcileOutcome::Deleted { record_id: 3 });

    let second = reconciler.ensure_absent("example.com", "_acme-challenge").await.unwrap();
    assert_eq!(second, ReconcileOutcome::AlreadyAbsent);

    assert_eq!(mock.writes().len(), 1);
    assert_eq!(mock.list_call_count(), 2);
    assert!(mock.records().is_empty());
}

#[tokio::test]
async fn cleanup_on_empty_zone_is_success() {
    let mock = MockDnsProvider::new();
    let reconciler = Reconciler::new(Box::new(mock.clone()));

    let outcome = reconciler.ensure_absent("example.com", "_acme-challenge").await.unwrap();

    assert_eq!(outcome, ReconcileOutcome::AlreadyAbsent);
    assert!(!outcome.wrote());
    assert!(mock.writes().is_empty());
}

#[tokio::test]
async fn present_then_cleanup_leaves_zone_as_before() {
    let unrelated = other_record(1, pdd_core::RecordType::A, "example.com", "www", "192.0.2.1");
    let mock = MockDnsProvider::new().with_record(unrelated.clone());
    let reconciler = Reconciler::new(Box::new(mock.clone()));

    reconciler.ensure_present(&target("v")).await.unwrap();
    assert_eq!(mock.records().len(), 2);

    reconciler.ensure_absent("example.com", "_acme-challenge").await.unwrap();
    assert_eq!(mock.records(), vec![unrelated]);
}
