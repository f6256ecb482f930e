//! Data types for the sync flow.

use std::collections::HashMap;
use std::path::PathBuf;

use matsync_protocol::constants::{
    DEFAULT_API_ROOT, DEFAULT_CONTENT_TYPE, DEFAULT_FILE_NAME, DEFAULT_ORIGIN,
};
use matsync_protocol::{PrinterSyncStatus, SyncResult};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Printer id → sync status.
pub type StatusMap = HashMap<String, PrinterSyncStatus>;

/// Settings of a sync job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Root of the cloud API, without trailing slash.
    pub api_root: String,
    /// File name announced in the upload request.
    pub file_name: String,
    /// Content type announced in the upload request and sent with the archive.
    pub content_type: String,
    /// Client token identifying the uploader.
    pub origin: String,
    /// Directory for the temporary archive (system temp dir if unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            temp_dir: None,
        }
    }
}

/// Lifecycle phase of a job. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Archive is being written.
    Archiving,
    /// Waiting for the upload slot.
    RequestingSlot,
    /// Archive bytes in flight.
    Uploading,
    /// Per-printer confirmations in flight.
    Confirming,
    Done,
}

/// Terminal outcome of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub result: SyncResult,
    /// Present iff `result` is `Failed`.
    pub error: Option<SyncError>,
}

impl SyncOutcome {
    pub fn success() -> Self {
        Self {
            result: SyncResult::Success,
            error: None,
        }
    }

    pub fn failed(error: SyncError) -> Self {
        Self {
            result: SyncResult::Failed,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == SyncResult::Success
    }

    /// User-facing message, if the job failed.
    pub fn message(&self) -> Option<&'static str> {
        self.error.as_ref().map(SyncError::user_message)
    }
}

/// Notification emitted by a running job.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Progress in [0, 1] plus the current per-printer status.
    Progress { progress: f64, statuses: StatusMap },
    /// Emitted exactly once, last.
    Completed(SyncOutcome),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let cfg = SyncConfig::default();
        assert_eq!(cfg.file_name, "cura.umm");
        assert_eq!(cfg.content_type, "application/zip");
        assert_eq!(cfg.origin, "cura");
        assert!(cfg.temp_dir.is_none());
    }

    #[test]
    fn config_partial_json_uses_defaults() {
        let cfg: SyncConfig = serde_json::from_str(r#"{"origin":"bench"}"#).unwrap();
        assert_eq!(cfg.origin, "bench");
        assert_eq!(cfg.api_root, DEFAULT_API_ROOT);
    }

    #[test]
    fn outcome_message_only_on_failure() {
        assert!(SyncOutcome::success().message().is_none());
        let failed = SyncOutcome::failed(SyncError::Transport("down".into()));
        assert_eq!(failed.message(), Some("Failed to connect to the cloud."));
        assert!(!failed.is_success());
    }
}
