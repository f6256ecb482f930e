//! Collaborator traits injected into a sync job.
//!
//! The application implements these on top of its HTTP client, archive
//! builder and machine registry. Keeping them as traits lets the job run
//! against fakes in tests.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use matsync_protocol::PrinterTarget;

/// Boxed, sendable future returned by collaborator calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Callback receiving archive progress as a fraction in [0, 1].
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// A reply that made it back over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure reported by the transport (connectivity, HTTP-level error).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportFailure(pub String);

/// Failure reported by the archive producer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ArchiveFailure(pub String);

/// Asynchronous HTTP transport.
///
/// Each call resolves exactly once. Implementations must copy any borrowed
/// arguments before the returned future starts.
pub trait Transport: Send + Sync {
    fn put(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportFailure>>;

    fn get(&self, url: &str) -> BoxFuture<'_, Result<TransportResponse, TransportFailure>>;
}

/// Writes the material archive to a destination.
pub trait ArchiveProducer: Send + Sync {
    /// Writes the archive to `destination`, calling `on_progress` as the
    /// write advances. Resolves once the file is complete.
    fn produce(
        &self,
        destination: &Path,
        on_progress: ProgressFn,
    ) -> BoxFuture<'_, Result<(), ArchiveFailure>>;
}

/// Source of printers to sync.
pub trait PrinterRegistry: Send + Sync {
    /// Returns the eligible targets, in a stable order.
    fn list_sync_targets(&self) -> Vec<PrinterTarget>;
}

impl PrinterRegistry for Vec<PrinterTarget> {
    fn list_sync_targets(&self) -> Vec<PrinterTarget> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(199, "").is_success());
        assert!(!TransportResponse::new(302, "").is_success());
        assert!(!TransportResponse::new(500, "").is_success());
    }

    #[test]
    fn static_target_list_is_a_registry() {
        let targets = vec![PrinterTarget::new("c1", "p1")];
        assert_eq!(targets.list_sync_targets(), targets);
    }
}
