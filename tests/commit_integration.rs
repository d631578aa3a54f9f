//! Batch saves against the in-memory backend.

use resort_admin::api::{ApiError, MemoryBackend};
use resort_admin::buffer::{PendingChanges, effective_view};
use resort_admin::commit::{self, save_all};
use resort_admin::record::{FieldValue, OpenTotal, RecordId, Resort, ResortField};

fn resorts(count: usize) -> Vec<Resort> {
    (1..=count)
        .map(|i| Resort {
            id: RecordId::from(format!("r{i}")),
            country: "Canada".to_string(),
            lifts: OpenTotal::new(1, 3),
            ..Resort::named(format!("Resort {i}"))
        })
        .collect()
}

fn text(s: &str) -> FieldValue {
    FieldValue::Text(s.to_string())
}

#[test]
fn test_edits_across_records_are_saved_in_one_batch() {
    let mut base = resorts(3);
    let backend = MemoryBackend::new(base.clone(), Vec::new(), Vec::new());
    let mut pending = PendingChanges::new();
    pending.stage(&RecordId::from("r1"), ResortField::Notes, text("groomed")).unwrap();
    pending
        .stage(&RecordId::from("r1"), ResortField::Lifts, FieldValue::Tally(OpenTotal::new(3, 3)))
        .unwrap();
    pending.stage(&RecordId::from("r3"), ResortField::Flagged, FieldValue::Flag(true)).unwrap();

    let summary = save_all(&backend, &mut base, &mut pending);

    assert_eq!(summary.succeeded, 2);
    assert!(summary.is_clean());
    assert!(pending.is_empty());
    assert_eq!(backend.update_log(), vec![RecordId::from("r1"), RecordId::from("r3")]);
    let stored = backend.resorts();
    assert_eq!(stored[0].notes, "groomed");
    assert_eq!(stored[0].lifts, OpenTotal::new(3, 3));
    assert!(stored[2].flagged);
    assert_eq!(base, stored);
}

#[test]
fn test_one_failure_keeps_exactly_that_record_staged() {
    let mut base = resorts(4);
    let backend = MemoryBackend::new(base.clone(), Vec::new(), Vec::new());
    let failing = RecordId::from("r2");
    backend.fail_on(
        &failing,
        ApiError::Rejected {
            status: 422,
            message: "invalid elevation".to_string(),
        },
    );
    let mut pending = PendingChanges::new();
    for resort in &base {
        pending.stage(&resort.id, ResortField::TopElevation, text("2,000 m")).unwrap();
    }

    let summary = save_all(&backend, &mut base, &mut pending);

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        summary.to_string(),
        "Updated 3 resort(s), Failed 1: r2: invalid elevation (HTTP 422)"
    );
    assert_eq!(backend.update_log().len(), 4, "later records still submitted");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending.get(&failing, ResortField::TopElevation), Some(&text("2,000 m")));
    assert_eq!(base[1].top_elevation, "", "failed record keeps its base copy");

    let view = effective_view(&base, &pending);
    assert!(view.iter().all(|r| r.top_elevation == "2,000 m"));
}

#[test]
fn test_record_deleted_remotely_fails_and_others_succeed() {
    let mut base = resorts(2);
    let backend = MemoryBackend::new(base.clone(), Vec::new(), Vec::new());
    backend.remove_resort(&RecordId::from("r1"));
    let mut pending = PendingChanges::new();
    pending.stage(&RecordId::from("r1"), ResortField::Notes, text("a")).unwrap();
    pending.stage(&RecordId::from("r2"), ResortField::Notes, text("b")).unwrap();

    let summary = save_all(&backend, &mut base, &mut pending);

    assert_eq!(summary.succeeded, 1);
    assert!(matches!(summary.first_error, Some((ref id, ApiError::NotFound(_))) if id.as_str() == "r1"));
    assert!(pending.contains(&RecordId::from("r1")));
    assert!(!pending.contains(&RecordId::from("r2")));
}

#[test]
fn test_discard_then_save_sends_nothing() {
    let mut base = resorts(2);
    let backend = MemoryBackend::new(base.clone(), Vec::new(), Vec::new());
    let mut pending = PendingChanges::new();
    pending.stage(&RecordId::from("r1"), ResortField::Name, text("Renamed")).unwrap();
    assert_eq!(pending.discard_all(), 1);

    let summary = save_all(&backend, &mut base, &mut pending);
    assert_eq!(summary.to_string(), "No pending changes");
    assert!(backend.update_log().is_empty());
}

#[test]
fn test_prepared_job_is_a_snapshot() {
    let base = resorts(1);
    let id = RecordId::from("r1");
    let mut pending = PendingChanges::new();
    pending.stage(&id, ResortField::Notes, text("before")).unwrap();

    let job = commit::prepare(&base, &pending);
    pending.stage(&id, ResortField::Notes, text("after")).unwrap();

    assert_eq!(job.items()[0].record.as_ref().unwrap().notes, "before");
}
