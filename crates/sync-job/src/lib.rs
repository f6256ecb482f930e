//! Material sync job: push the local material profiles to cloud printers.
//!
//! This crate implements the **business logic** of a material sync. It is
//! a library crate with no HTTP or UI dependencies: the application
//! injects a [`Transport`], an [`ArchiveProducer`] and optionally a
//! [`PrinterRegistry`].
//!
//! # Pipeline
//!
//! 1. **Archive** - write the material archive to a temporary file
//! 2. **Request slot** - announce the archive, receive an upload URL
//! 3. **Upload** - PUT the archive bytes to that URL
//! 4. **Confirm** - ask every printer to fetch it, concurrently
//!
//! Progress and exactly one completion notification are delivered on the
//! event channel returned by [`MaterialSyncJob::take_events`].

pub mod collaborators;
pub mod error;
pub mod finalizer;
pub mod job;
pub mod machine;
pub mod progress;
pub mod registry;
pub mod types;

// Re-export primary types for convenience.
pub use collaborators::{
    ArchiveFailure, ArchiveProducer, BoxFuture, PrinterRegistry, ProgressFn, Transport,
    TransportFailure, TransportResponse,
};
pub use error::{ErrorKind, ProtocolFault, SyncError};
pub use job::MaterialSyncJob;
pub use machine::{Action, JobEvent, SyncMachine};
pub use registry::MachineRegistry;
pub use types::{Phase, StatusMap, SyncConfig, SyncEvent, SyncOutcome};
