//! Wire types and endpoint helpers for the cloud material upload API.

pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use messages::{
    SlotError, UploadRequest, UploadRequestData, UploadSlot, UploadSlotResponse,
    parse_upload_slot,
};
pub use types::{ConnectionType, PrinterRecord, PrinterSyncStatus, PrinterTarget, SyncResult};
