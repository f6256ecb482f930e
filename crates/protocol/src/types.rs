use serde::{Deserialize, Serialize};

/// One printer that should receive the synced materials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrinterTarget {
    pub cluster_id: String,
    pub printer_id: String,
}

impl PrinterTarget {
    pub fn new(cluster_id: impl Into<String>, printer_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            printer_id: printer_id.into(),
        }
    }
}

/// Sync state of a single printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterSyncStatus {
    Uploading,
    Success,
    Failed,
}

impl PrinterSyncStatus {
    /// Whether the printer has left the `uploading` state.
    pub fn is_resolved(self) -> bool {
        !matches!(self, PrinterSyncStatus::Uploading)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrinterSyncStatus::Uploading => "uploading",
            PrinterSyncStatus::Success => "success",
            PrinterSyncStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PrinterSyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a sync job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncResult {
    Success,
    Failed,
}

/// Printer metadata as kept by the local machine registry.
///
/// Only records that are cloud-connected, online and carry both
/// identifiers can be synced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
}

/// How a printer is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    #[default]
    NotConnected,
    Usb,
    Network,
    Cloud,
}
