//! In-memory record list together with the draft being edited.

use log::debug;

use crate::error::DraftError;
use crate::model::{VehicleField, VehicleRecord};

/// Holds the committed records and the in-progress draft.
///
/// Nothing is persisted; the store lives as long as the application.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    records: Vec<VehicleRecord>,
    draft: VehicleRecord,
}

impl RecordStore {
    /// Creates an empty store with an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the committed records in insertion order.
    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    /// Returns the number of committed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether no record has been committed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the draft.
    pub fn draft(&self) -> &VehicleRecord {
        &self.draft
    }

    /// Replaces one field of the draft. Any value is accepted.
    pub fn set_field(&mut self, field: VehicleField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    /// Appends the draft to the list and resets it.
    ///
    /// Rejected without any mutation when both model and VIN are empty.
    pub fn commit(&mut self) -> Result<usize, DraftError> {
        if !self.draft.has_identity() {
            return Err(DraftError::MissingIdentity);
        }

        let record = std::mem::take(&mut self.draft);
        self.records.push(record);
        debug!("committed record #{}", self.records.len());
        Ok(self.records.len() - 1)
    }

    /// Removes the record at `index`, shifting later records forward.
    ///
    /// Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<VehicleRecord> {
        if index < self.records.len() {
            Some(self.records.remove(index))
        } else {
            None
        }
    }

    /// Empties the list and resets the draft.
    pub fn clear(&mut self) {
        self.records.clear();
        self.draft = VehicleRecord::default();
    }
}
