//! Application state shared by every view.
//!
//! [`SheetApp`] is the single owner of the draft, the record list and the
//! exporting flag. Views receive it by reference and turn user interaction
//! into calls on it; nothing else holds mutable state.

use log::{error, info};

use crate::capture::SheetCapture;
use crate::error::{DraftError, ExportError};
use crate::export::{ExportOutcome, Exporter};
use crate::model::{VehicleField, VehicleRecord};
use crate::store::RecordStore;

/// Top-level controller.
#[derive(Debug, Default)]
pub struct SheetApp {
    store: RecordStore,
    exporting: bool,
}

/// Snapshot of the record list taken when an export starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportJob {
    records: Vec<VehicleRecord>,
}

impl ExportJob {
    /// Records that will be exported.
    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    /// Runs the export; safe to call from a worker thread.
    pub fn run<C: SheetCapture>(
        &self,
        exporter: &Exporter<C>,
    ) -> Result<ExportOutcome, ExportError> {
        exporter.export(&self.records)
    }
}

impl SheetApp {
    /// Creates the application state with an empty list and draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed records in display order.
    pub fn records(&self) -> &[VehicleRecord] {
        self.store.records()
    }

    /// The record being edited.
    pub fn draft(&self) -> &VehicleRecord {
        self.store.draft()
    }

    /// Replaces one draft field.
    pub fn set_field(&mut self, field: VehicleField, value: impl Into<String>) {
        self.store.set_field(field, value);
    }

    /// Commits the draft to the list.
    pub fn add_to_list(&mut self) -> Result<(), DraftError> {
        let index = self.store.commit()?;
        info!("added vehicle #{}", index + 1);
        Ok(())
    }

    /// Removes the record at `index`; returns whether anything was removed.
    pub fn remove(&mut self, index: usize) -> bool {
        self.store.remove(index).is_some()
    }

    /// Empties the list and the draft. Callers confirm with the user first.
    pub fn clear(&mut self) {
        self.store.clear();
        info!("cleared vehicle list");
    }

    /// Returns whether an export is running.
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Returns whether the export control should be enabled.
    pub fn can_export(&self) -> bool {
        !self.exporting && !self.store.is_empty()
    }

    /// Checks the preconditions and marks the export as running.
    pub fn begin_export(&mut self) -> Result<ExportJob, ExportError> {
        if self.exporting {
            return Err(ExportError::InProgress);
        }
        if self.store.is_empty() {
            return Err(ExportError::EmptyList);
        }

        self.exporting = true;
        Ok(ExportJob {
            records: self.store.records().to_vec(),
        })
    }

    /// Clears the running flag and reports the result.
    pub fn finish_export(
        &mut self,
        result: Result<ExportOutcome, ExportError>,
    ) -> Result<ExportOutcome, ExportError> {
        self.exporting = false;
        if let Err(err) = &result {
            log_export_failure(err);
        }
        result
    }

    /// Runs a complete export on the calling thread.
    pub fn export_with<C: SheetCapture>(
        &mut self,
        exporter: &Exporter<C>,
    ) -> Result<ExportOutcome, ExportError> {
        let job = self.begin_export()?;
        let result = job.run(exporter);
        self.finish_export(result)
    }
}

fn log_export_failure(err: &ExportError) {
    let mut message = format!("PDF export failed: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(&format!("; caused by: {cause}"));
        source = cause.source();
    }
    error!("{}", message);
}
