//! Batch commit of staged edits.
//!
//! A save runs in three steps so the network part can leave the UI thread:
//!
//! 1. [`prepare`] snapshots every pending entry together with the full
//!    record to submit (base overlaid with the staged fields).
//! 2. [`run`] submits one update per record, in staging order. A failure
//!    is recorded and the loop moves on.
//! 3. [`reconcile`] folds the outcomes back: saved records replace their
//!    base copy and the committed fields are unstaged; failed records keep
//!    every staged field.

use std::fmt;

use crate::api::{ApiError, ResortApi};
use crate::buffer::{PendingChanges, StagedFields, effective_record};
use crate::record::{RecordId, Resort, ResortField};

/// One record's share of a save.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitItem {
    pub id: RecordId,
    /// The staged fields as they were when the save started.
    pub staged: StagedFields,
    /// The full record to submit; `None` when the id was not in base.
    pub record: Option<Resort>,
}

/// A snapshot of everything to save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitJob {
    items: Vec<CommitItem>,
}

impl CommitJob {
    pub fn items(&self) -> &[CommitItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether this job submits a value for `field` of record `id`.
    pub fn covers(&self, id: &RecordId, field: ResortField) -> bool {
        self.items
            .iter()
            .any(|item| &item.id == id && item.staged.contains_key(&field))
    }
}

/// Snapshot `pending` against `base`.
pub fn prepare(base: &[Resort], pending: &PendingChanges) -> CommitJob {
    let items = pending
        .entries()
        .iter()
        .map(|entry| CommitItem {
            id: entry.id.clone(),
            staged: entry.fields.clone(),
            record: base
                .iter()
                .find(|record| record.id == entry.id)
                .map(|record| effective_record(record, &entry.fields)),
        })
        .collect();
    CommitJob { items }
}

/// Outcome for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub id: RecordId,
    pub staged: StagedFields,
    pub result: Result<Resort, ApiError>,
}

/// Outcomes of a whole save, in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReport {
    pub outcomes: Vec<RecordOutcome>,
}

/// Submit every item of `job`, one at a time.
///
/// Never stops early: each record's error is captured in its outcome.
pub fn run<A: ResortApi + ?Sized>(api: &A, job: CommitJob) -> CommitReport {
    tracing::info!(records = job.len(), "saving staged edits");
    let outcomes = job
        .items
        .into_iter()
        .map(|item| {
            let result = match &item.record {
                Some(record) => api.update_resort(record),
                None => Err(ApiError::NotFound(format!("resort {}", item.id))),
            };
            match &result {
                Ok(_) => tracing::info!(id = %item.id, fields = item.staged.len(), "saved"),
                Err(err) => {
                    tracing::warn!(id = %item.id, code = err.code().as_str(), error = %err, "save failed");
                }
            }
            RecordOutcome {
                id: item.id,
                staged: item.staged,
                result,
            }
        })
        .collect();
    CommitReport { outcomes }
}

/// A report that fails every item of `job` with `reason`, for a save that
/// stopped before it could report.
pub fn abandoned(job: &CommitJob, reason: &str) -> CommitReport {
    let outcomes = job
        .items
        .iter()
        .map(|item| RecordOutcome {
            id: item.id.clone(),
            staged: item.staged.clone(),
            result: Err(ApiError::Transport(reason.to_string())),
        })
        .collect();
    CommitReport { outcomes }
}

/// What a save achieved, for the one notice shown afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub first_error: Option<(RecordId, ApiError)>,
}

impl CommitSummary {
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for CommitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.succeeded == 0 && self.failed == 0 {
            return f.write_str("No pending changes");
        }
        if self.succeeded > 0 {
            write!(f, "Updated {} resort(s)", self.succeeded)?;
        }
        if self.failed > 0 {
            if self.succeeded > 0 {
                f.write_str(", ")?;
            }
            write!(f, "Failed {}", self.failed)?;
            if let Some((id, err)) = &self.first_error {
                write!(f, ": {id}: {err}")?;
            }
        }
        Ok(())
    }
}

/// Fold `report` back into `base` and `pending`.
///
/// Saved records take the backend's copy. Only fields whose staged value is
/// unchanged since the snapshot are unstaged, so edits made while the save
/// was in flight stay pending.
pub fn reconcile(
    base: &mut [Resort],
    pending: &mut PendingChanges,
    report: &CommitReport,
) -> CommitSummary {
    let mut summary = CommitSummary::default();
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(saved) => {
                summary.succeeded += 1;
                if let Some(slot) = base.iter_mut().find(|record| record.id == outcome.id) {
                    *slot = Resort {
                        id: outcome.id.clone(),
                        ..saved.clone()
                    };
                }
                pending.settle(&outcome.id, &outcome.staged);
            }
            Err(err) => {
                summary.failed += 1;
                if summary.first_error.is_none() {
                    summary.first_error = Some((outcome.id.clone(), err.clone()));
                }
            }
        }
    }
    summary
}

/// Prepare, run and reconcile in one call, on the current thread.
pub fn save_all<A: ResortApi + ?Sized>(
    api: &A,
    base: &mut [Resort],
    pending: &mut PendingChanges,
) -> CommitSummary {
    let job = prepare(base, pending);
    let report = run(api, job);
    reconcile(base, pending, &report)
}
