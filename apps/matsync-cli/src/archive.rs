//! Archive producer that stages a pre-built material package.

use std::path::{Path, PathBuf};

use matsync_sync_job::{ArchiveFailure, ArchiveProducer, BoxFuture, ProgressFn};
use matsync_transfer::{DEFAULT_CHUNK_SIZE, calculate_file_checksum, copy_chunked};
use tracing::info;

/// Copies an existing `.umm` package into the job's archive location.
pub struct PackagedArchive {
    source: PathBuf,
    chunk_size: usize,
}

impl PackagedArchive {
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl ArchiveProducer for PackagedArchive {
    fn produce(
        &self,
        destination: &Path,
        on_progress: ProgressFn,
    ) -> BoxFuture<'_, Result<(), ArchiveFailure>> {
        let source = self.source.clone();
        let destination = destination.to_path_buf();
        let chunk_size = self.chunk_size;

        Box::pin(async move {
            let copied = tokio::task::spawn_blocking(move || {
                let bytes = copy_chunked(&source, &destination, chunk_size, |f| on_progress(f))?;
                let checksum = calculate_file_checksum(&destination)?;
                Ok::<_, matsync_transfer::TransferError>((bytes, checksum))
            })
            .await;

            match copied {
                Ok(Ok((bytes, checksum))) => {
                    info!(bytes, sha256 = %checksum, "material archive staged");
                    Ok(())
                }
                Ok(Err(e)) => Err(ArchiveFailure(e.to_string())),
                Err(e) => Err(ArchiveFailure(format!("archive task failed: {e}"))),
            }
        })
    }
}
