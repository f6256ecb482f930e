//! Sync state machine.
//!
//! `SyncMachine` owns the job state and performs no I/O. Each incoming
//! [`JobEvent`] is dispatched on the current [`Phase`] and yields the
//! [`Action`]s the driver must carry out: network calls to issue and
//! notifications to emit. Events that do not belong to the current phase
//! are dropped.

use std::path::{Path, PathBuf};

use matsync_protocol::constants::{confirm_upload_url, upload_request_url};
use matsync_protocol::{PrinterSyncStatus, PrinterTarget, UploadRequest, parse_upload_slot};
use tracing::{debug, error, info, warn};

use crate::collaborators::{TransportFailure, TransportResponse};
use crate::error::{ProtocolFault, SyncError};
use crate::finalizer::{self, StatusTable};
use crate::progress::ProgressAggregator;
use crate::types::{Phase, SyncConfig, SyncEvent, SyncOutcome};

/// Result of a transport call as fed back into the machine.
pub type TransportResult = Result<TransportResponse, TransportFailure>;

/// Something that happened outside the machine.
#[derive(Debug)]
pub enum JobEvent {
    /// Archive producer progress, fraction in [0, 1].
    ArchiveProgress(f64),
    /// Archive fully written; `file_size` read back from disk.
    ArchiveReady { file_size: u64 },
    /// Archive could not be written or read.
    ArchiveFailed(String),
    UploadRequestResolved(TransportResult),
    UploadResolved(TransportResult),
    ConfirmationResolved {
        printer_id: String,
        outcome: TransportResult,
    },
}

impl JobEvent {
    fn name(&self) -> &'static str {
        match self {
            JobEvent::ArchiveProgress(_) => "archive_progress",
            JobEvent::ArchiveReady { .. } => "archive_ready",
            JobEvent::ArchiveFailed(_) => "archive_failed",
            JobEvent::UploadRequestResolved(_) => "upload_request_resolved",
            JobEvent::UploadResolved(_) => "upload_resolved",
            JobEvent::ConfirmationResolved { .. } => "confirmation_resolved",
        }
    }
}

/// Work the driver must perform after a transition.
#[derive(Debug, Clone)]
pub enum Action {
    /// Create the archive location and run the producer.
    ProduceArchive,
    /// PUT the upload request body.
    RequestUploadSlot { url: String, body: Vec<u8> },
    /// PUT the archive bytes read from `path`.
    UploadArchive {
        url: String,
        path: PathBuf,
        content_type: String,
    },
    /// GET the confirmation endpoint of one printer.
    Confirm { printer_id: String, url: String },
    /// Hand a notification to listeners.
    Emit(SyncEvent),
}

/// State of one material sync job.
#[derive(Debug)]
pub struct SyncMachine {
    config: SyncConfig,
    phase: Phase,
    targets: Vec<PrinterTarget>,
    statuses: StatusTable,
    progress: ProgressAggregator,
    archive_path: Option<PathBuf>,
    archive_remote_id: Option<String>,
    outcome: Option<SyncOutcome>,
}

impl SyncMachine {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            targets: Vec::new(),
            statuses: StatusTable::default(),
            progress: ProgressAggregator::new(),
            archive_path: None,
            archive_remote_id: None,
            outcome: None,
        }
    }

    /// Accepts the targets and kicks off archive creation.
    ///
    /// Fails without side effects if the job was already started or
    /// `targets` is empty.
    pub fn start(&mut self, targets: Vec<PrinterTarget>) -> Result<Vec<Action>, SyncError> {
        if self.phase != Phase::Idle {
            return Err(SyncError::AlreadyStarted);
        }
        if targets.is_empty() {
            return Err(SyncError::Configuration);
        }

        let mut unique: Vec<PrinterTarget> = Vec::with_capacity(targets.len());
        for target in targets {
            if unique.iter().any(|t| t.printer_id == target.printer_id) {
                warn!(printer = %target.printer_id, "duplicate sync target skipped");
                continue;
            }
            unique.push(target);
        }

        self.statuses = StatusTable::new(&unique);
        self.targets = unique;
        self.phase = Phase::Archiving;
        info!(printers = self.targets.len(), "material sync started");

        Ok(vec![
            Action::Emit(self.progress_event(self.progress.current())),
            Action::ProduceArchive,
        ])
    }

    /// Records where the archive is being written.
    pub fn set_archive_path(&mut self, path: PathBuf) {
        debug!(path = %path.display(), "archive location");
        self.archive_path = Some(path);
    }

    /// Applies one event.
    pub fn handle(&mut self, event: JobEvent) -> Vec<Action> {
        match (self.phase, event) {
            (Phase::Done, event) => {
                debug!(event = event.name(), "job finished, event ignored");
                Vec::new()
            }
            (Phase::Archiving, JobEvent::ArchiveProgress(fraction)) => {
                let progress = self.progress.archive(fraction);
                vec![Action::Emit(self.progress_event(progress))]
            }
            (_, JobEvent::ArchiveProgress(_)) => Vec::new(),
            (Phase::Archiving, JobEvent::ArchiveReady { file_size }) => {
                self.on_archive_ready(file_size)
            }
            (Phase::Archiving | Phase::Uploading, JobEvent::ArchiveFailed(reason)) => {
                self.fail(SyncError::Archive(reason))
            }
            (Phase::RequestingSlot, JobEvent::UploadRequestResolved(result)) => {
                self.on_upload_request_resolved(result)
            }
            (Phase::Uploading, JobEvent::UploadResolved(result)) => {
                self.on_upload_resolved(result)
            }
            (
                Phase::Confirming,
                JobEvent::ConfirmationResolved {
                    printer_id,
                    outcome,
                },
            ) => self.on_confirmation_resolved(&printer_id, outcome),
            (phase, event) => {
                warn!(?phase, event = event.name(), "event out of phase, ignored");
                Vec::new()
            }
        }
    }

    fn on_archive_ready(&mut self, file_size: u64) -> Vec<Action> {
        let request = UploadRequest::new(
            file_size,
            self.config.file_name.clone(),
            self.config.content_type.clone(),
            self.config.origin.clone(),
        );
        let body = match serde_json::to_vec(&request) {
            Ok(body) => body,
            Err(e) => return self.fail(ProtocolFault::Encode(e.to_string()).into()),
        };

        self.phase = Phase::RequestingSlot;
        debug!(file_size, "archive ready, requesting upload slot");
        vec![Action::RequestUploadSlot {
            url: upload_request_url(&self.config.api_root),
            body,
        }]
    }

    fn on_upload_request_resolved(&mut self, result: TransportResult) -> Vec<Action> {
        let response = match result {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                return self.fail(SyncError::Transport(format!(
                    "upload request returned HTTP {}",
                    response.status
                )));
            }
            Err(e) => return self.fail(SyncError::Transport(e.0)),
        };

        let slot = match parse_upload_slot(&response.body) {
            Ok(slot) => slot,
            Err(e) => return self.fail(SyncError::Protocol(e.into())),
        };

        let Some(path) = self.archive_path.clone() else {
            return self.fail(SyncError::Archive("archive location was never recorded".into()));
        };

        debug!(remote_id = %slot.material_profile_id, "upload slot granted");
        self.archive_remote_id = Some(slot.material_profile_id);
        self.phase = Phase::Uploading;
        vec![Action::UploadArchive {
            url: slot.upload_url,
            path,
            content_type: self.config.content_type.clone(),
        }]
    }

    fn on_upload_resolved(&mut self, result: TransportResult) -> Vec<Action> {
        match result {
            Ok(response) if response.is_success() => {}
            Ok(response) => {
                return self.fail(SyncError::Transport(format!(
                    "archive upload returned HTTP {}",
                    response.status
                )));
            }
            Err(e) => return self.fail(SyncError::Transport(e.0)),
        }

        self.phase = Phase::Confirming;
        debug!(printers = self.targets.len(), "archive uploaded, confirming");
        self.targets
            .iter()
            .map(|t| Action::Confirm {
                printer_id: t.printer_id.clone(),
                url: confirm_upload_url(&self.config.api_root, &t.cluster_id, &t.printer_id),
            })
            .collect()
    }

    fn on_confirmation_resolved(&mut self, printer_id: &str, outcome: TransportResult) -> Vec<Action> {
        let status = match &outcome {
            Ok(response) if response.is_success() => PrinterSyncStatus::Success,
            Ok(response) => {
                warn!(printer = %printer_id, status = response.status, "confirmation rejected");
                PrinterSyncStatus::Failed
            }
            Err(e) => {
                error!(printer = %printer_id, error = %e, "failed to confirm material upload");
                PrinterSyncStatus::Failed
            }
        };

        if let Err(e) = self.statuses.resolve(printer_id, status) {
            warn!(error = %e, "confirmation ignored");
            return Vec::new();
        }

        let progress = self
            .progress
            .confirmations(self.statuses.resolved_count(), self.statuses.len());
        let mut actions = vec![Action::Emit(self.progress_event(progress))];
        if let Some(outcome) = finalizer::evaluate(&self.statuses) {
            actions.push(self.complete(outcome));
        }
        actions
    }

    /// Ends the job on a fatal error: pending printers fail and progress
    /// jumps to 1.0 before the completion notification.
    fn fail(&mut self, error: SyncError) -> Vec<Action> {
        error!(error = %error, phase = ?self.phase, "material sync failed");
        self.statuses.fail_pending();
        let progress = self.progress.finish();
        vec![
            Action::Emit(self.progress_event(progress)),
            self.complete(SyncOutcome::failed(error)),
        ]
    }

    fn complete(&mut self, outcome: SyncOutcome) -> Action {
        self.phase = Phase::Done;
        match &outcome.error {
            None => info!(printers = self.statuses.len(), "material sync completed"),
            Some(e) => warn!(error = %e, "material sync finished with errors"),
        }
        self.outcome = Some(outcome.clone());
        Action::Emit(SyncEvent::Completed(outcome))
    }

    fn progress_event(&self, progress: f64) -> SyncEvent {
        SyncEvent::Progress {
            progress,
            statuses: self.statuses.snapshot(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn statuses(&self) -> &StatusTable {
        &self.statuses
    }

    pub fn targets(&self) -> &[PrinterTarget] {
        &self.targets
    }

    pub fn progress(&self) -> f64 {
        self.progress.current()
    }

    pub fn outcome(&self) -> Option<&SyncOutcome> {
        self.outcome.as_ref()
    }

    pub fn archive_path(&self) -> Option<&Path> {
        self.archive_path.as_deref()
    }

    pub fn archive_remote_id(&self) -> Option<&str> {
        self.archive_remote_id.as_deref()
    }
}
