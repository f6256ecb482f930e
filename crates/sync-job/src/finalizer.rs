//! Per-printer status table and the terminal-outcome decision.

use matsync_protocol::{PrinterSyncStatus, PrinterTarget};

use crate::error::SyncError;
use crate::types::{StatusMap, SyncOutcome};

/// Why a status update was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("unknown printer: {0}")]
    UnknownPrinter(String),

    #[error("printer {printer} already resolved as {status}")]
    AlreadyResolved {
        printer: String,
        status: PrinterSyncStatus,
    },
}

/// Status of every target, in target order.
///
/// Each entry starts as `uploading` and moves exactly once to `success`
/// or `failed`.
#[derive(Debug, Clone, Default)]
pub struct StatusTable {
    entries: Vec<(String, PrinterSyncStatus)>,
}

impl StatusTable {
    /// Builds a table with every target `uploading`. Repeated printer ids
    /// keep their first position.
    pub fn new(targets: &[PrinterTarget]) -> Self {
        let mut entries: Vec<(String, PrinterSyncStatus)> = Vec::with_capacity(targets.len());
        for t in targets {
            if !entries.iter().any(|(id, _)| *id == t.printer_id) {
                entries.push((t.printer_id.clone(), PrinterSyncStatus::Uploading));
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, printer_id: &str) -> Option<PrinterSyncStatus> {
        self.entries
            .iter()
            .find(|(id, _)| id == printer_id)
            .map(|(_, s)| *s)
    }

    /// Moves one printer out of `uploading`.
    pub fn resolve(
        &mut self,
        printer_id: &str,
        status: PrinterSyncStatus,
    ) -> Result<(), StatusError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|(id, _)| id == printer_id)
            .ok_or_else(|| StatusError::UnknownPrinter(printer_id.to_string()))?;
        if entry.1.is_resolved() {
            return Err(StatusError::AlreadyResolved {
                printer: printer_id.to_string(),
                status: entry.1,
            });
        }
        entry.1 = status;
        Ok(())
    }

    /// Marks every printer still `uploading` as `failed`.
    pub fn fail_pending(&mut self) {
        for (_, status) in &mut self.entries {
            if !status.is_resolved() {
                *status = PrinterSyncStatus::Failed;
            }
        }
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|(_, s)| s.is_resolved()).count()
    }

    pub fn pending_count(&self) -> usize {
        self.len() - self.resolved_count()
    }

    pub fn failed(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, s)| *s == PrinterSyncStatus::Failed)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Entries in target order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, PrinterSyncStatus)> {
        self.entries.iter().map(|(id, s)| (id.as_str(), *s))
    }

    pub fn snapshot(&self) -> StatusMap {
        self.entries.iter().cloned().collect()
    }
}

/// Decides the outcome once no printer is left `uploading`.
///
/// Returns `None` while confirmations are outstanding. Any failed printer
/// fails the whole job.
pub fn evaluate(table: &StatusTable) -> Option<SyncOutcome> {
    if table.pending_count() > 0 {
        return None;
    }
    let failed = table.failed();
    if failed.is_empty() {
        Some(SyncOutcome::success())
    } else {
        Some(SyncOutcome::failed(SyncError::PartialSyncFailure { failed }))
    }
}
