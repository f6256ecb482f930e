//! Chunked archive I/O: reading in fixed-size pieces, copying with
//! fractional progress, and SHA-256 checksums.

mod chunked;
mod copy;

pub use chunked::{Chunk, ChunkReader, calculate_file_checksum};
pub use copy::copy_chunked;

/// Default chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source changed size during copy: expected {expected} bytes, copied {copied}")]
    Truncated { expected: u64, copied: u64 },
}
