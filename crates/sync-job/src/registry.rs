//! Printer registry backed by known machine records.

use matsync_protocol::{ConnectionType, PrinterRecord, PrinterTarget};
use tracing::debug;

use crate::collaborators::PrinterRegistry;

/// Registry over the locally known printers.
#[derive(Debug, Clone, Default)]
pub struct MachineRegistry {
    records: Vec<PrinterRecord>,
}

impl MachineRegistry {
    pub fn new(records: Vec<PrinterRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PrinterRecord] {
        &self.records
    }
}

/// Returns the sync target for a record, if it can receive materials.
///
/// Requires a cloud connection, the printer being online, and both the
/// cluster and host identifiers.
pub fn sync_target(record: &PrinterRecord) -> Option<PrinterTarget> {
    if record.connection_type != ConnectionType::Cloud || !record.is_online {
        return None;
    }
    let cluster_id = record.cluster_id.as_deref().filter(|s| !s.is_empty())?;
    let printer_id = record.host_guid.as_deref().filter(|s| !s.is_empty())?;
    Some(PrinterTarget::new(cluster_id, printer_id))
}

impl PrinterRegistry for MachineRegistry {
    fn list_sync_targets(&self) -> Vec<PrinterTarget> {
        let mut targets: Vec<PrinterTarget> = Vec::new();
        for record in &self.records {
            let Some(target) = sync_target(record) else {
                debug!(printer = %record.name, "not eligible for material sync");
                continue;
            };
            if targets.iter().any(|t| t.printer_id == target.printer_id) {
                continue;
            }
            targets.push(target);
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud(name: &str, cluster: &str, guid: &str) -> PrinterRecord {
        PrinterRecord {
            name: name.into(),
            connection_type: ConnectionType::Cloud,
            is_online: true,
            host_guid: Some(guid.into()),
            cluster_id: Some(cluster.into()),
        }
    }

    #[test]
    fn keeps_online_cloud_printers_in_order() {
        let registry = MachineRegistry::new(vec![
            cloud("S5", "c1", "p1"),
            cloud("S3", "c2", "p2"),
        ]);
        assert_eq!(
            registry.list_sync_targets(),
            vec![PrinterTarget::new("c1", "p1"), PrinterTarget::new("c2", "p2")]
        );
    }

    #[test]
    fn skips_ineligible_records() {
        let offline = PrinterRecord {
            is_online: false,
            ..cloud("offline", "c1", "p1")
        };
        let network = PrinterRecord {
            connection_type: ConnectionType::Network,
            ..cloud("lan", "c2", "p2")
        };
        let no_cluster = PrinterRecord {
            cluster_id: None,
            ..cloud("no-cluster", "c3", "p3")
        };
        let blank_guid = PrinterRecord {
            host_guid: Some(String::new()),
            ..cloud("blank", "c4", "p4")
        };
        let registry = MachineRegistry::new(vec![
            offline,
            network,
            no_cluster,
            blank_guid,
            cloud("ok", "c5", "p5"),
        ]);
        assert_eq!(
            registry.list_sync_targets(),
            vec![PrinterTarget::new("c5", "p5")]
        );
    }

    #[test]
    fn duplicate_printer_kept_once() {
        let registry = MachineRegistry::new(vec![
            cloud("first", "c1", "p1"),
            cloud("again", "c9", "p1"),
        ]);
        assert_eq!(
            registry.list_sync_targets(),
            vec![PrinterTarget::new("c1", "p1")]
        );
    }

    #[test]
    fn empty_registry_lists_nothing() {
        assert!(MachineRegistry::default().list_sync_targets().is_empty());
    }
}
