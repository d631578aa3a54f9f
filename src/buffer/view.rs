use crate::record::Resort;

use super::{PendingChanges, StagedFields};

/// Overlay staged fields onto a copy of `base`.
pub fn effective_record(base: &Resort, staged: &StagedFields) -> Resort {
    let mut merged = base.clone();
    for (field, value) in staged {
        // Values are kind-checked when staged, so this only fails on a bug.
        if let Err(err) = merged.set(*field, value.clone()) {
            tracing::warn!(id = %base.id, %err, "skipping staged value");
        }
    }
    merged
}

/// The records as the user currently sees them: base records in their
/// original order, each overlaid with its staged fields.
///
/// Pure in both inputs. Staged entries whose id is not in `base` are ignored.
pub fn effective_view(base: &[Resort], pending: &PendingChanges) -> Vec<Resort> {
    base.iter()
        .map(|record| match pending.fields(&record.id) {
            Some(staged) => effective_record(record, staged),
            None => record.clone(),
        })
        .collect()
}
