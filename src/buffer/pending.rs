use std::collections::BTreeMap;

use crate::record::{FieldError, FieldValue, RecordId, ResortField};

/// Staged values for one record, ordered by field.
pub type StagedFields = BTreeMap<ResortField, FieldValue>;

/// One record's staged fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    pub id: RecordId,
    pub fields: StagedFields,
}

/// Field-level edits that have not been sent to the backend yet.
///
/// Entries keep the order in which their record was first staged. A record
/// id is present only while it has at least one staged field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingChanges {
    entries: Vec<PendingEntry>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `value` for `field` of record `id`, replacing any earlier value.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::KindMismatch`] if the value does not fit the
    /// field. Nothing is staged in that case.
    pub fn stage(
        &mut self,
        id: &RecordId,
        field: ResortField,
        value: FieldValue,
    ) -> Result<(), FieldError> {
        field.check(&value)?;
        if let Some(entry) = self.entry_mut(id) {
            entry.fields.insert(field, value);
        } else {
            let mut fields = StagedFields::new();
            fields.insert(field, value);
            self.entries.push(PendingEntry {
                id: id.clone(),
                fields,
            });
        }
        Ok(())
    }

    /// Drop one staged field. Returns the value that was staged, if any.
    pub fn unstage(&mut self, id: &RecordId, field: ResortField) -> Option<FieldValue> {
        let idx = self.position(id)?;
        let removed = self.entries[idx].fields.remove(&field);
        if self.entries[idx].fields.is_empty() {
            self.entries.remove(idx);
        }
        removed
    }

    /// Drop every staged field of one record.
    pub fn unstage_record(&mut self, id: &RecordId) -> Option<StagedFields> {
        let idx = self.position(id)?;
        Some(self.entries.remove(idx).fields)
    }

    /// Drop everything. Returns how many records had staged fields.
    pub fn discard_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Remove the fields of `id` that still hold the values in `committed`.
    ///
    /// Fields restaged with a different value after `committed` was taken
    /// stay staged.
    pub fn settle(&mut self, id: &RecordId, committed: &StagedFields) {
        let Some(idx) = self.position(id) else {
            return;
        };
        self.entries[idx]
            .fields
            .retain(|field, value| committed.get(field) != Some(value));
        if self.entries[idx].fields.is_empty() {
            self.entries.remove(idx);
        }
    }

    /// Keep only entries whose id satisfies `keep`. Returns the dropped ids.
    pub fn retain_ids(&mut self, mut keep: impl FnMut(&RecordId) -> bool) -> Vec<RecordId> {
        let mut dropped = Vec::new();
        self.entries.retain(|entry| {
            let kept = keep(&entry.id);
            if !kept {
                dropped.push(entry.id.clone());
            }
            kept
        });
        dropped
    }

    pub fn fields(&self, id: &RecordId) -> Option<&StagedFields> {
        self.entries
            .iter()
            .find(|entry| &entry.id == id)
            .map(|entry| &entry.fields)
    }

    pub fn get(&self, id: &RecordId, field: ResortField) -> Option<&FieldValue> {
        self.fields(id)?.get(&field)
    }

    pub fn is_staged(&self, id: &RecordId, field: ResortField) -> bool {
        self.get(id, field).is_some()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.position(id).is_some()
    }

    /// Entries in staging order.
    pub fn entries(&self) -> &[PendingEntry] {
        &self.entries
    }

    /// Number of records with staged fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of staged fields across all records.
    pub fn field_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.fields.len()).sum()
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }

    fn entry_mut(&mut self, id: &RecordId) -> Option<&mut PendingEntry> {
        self.entries.iter_mut().find(|entry| &entry.id == id)
    }
}
