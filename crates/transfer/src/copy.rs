use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::{ChunkReader, TransferError};

/// Copies `src` to `dst` chunk by chunk, reporting the copied fraction
/// after every chunk.
///
/// `dst` is created or truncated. The final report is always `1.0`, also
/// for an empty source. Returns the number of bytes copied.
pub fn copy_chunked(
    src: &Path,
    dst: &Path,
    chunk_size: usize,
    mut on_progress: impl FnMut(f64),
) -> Result<u64, TransferError> {
    let mut reader = ChunkReader::new(src, chunk_size)?;
    let total = reader.file_size();
    let mut out = std::fs::File::create(dst)?;
    let mut copied = 0u64;

    while let Some(chunk) = reader.next_chunk()? {
        out.write_all(&chunk.data)?;
        copied += chunk.len() as u64;
        if total > 0 && copied < total {
            on_progress(copied as f64 / total as f64);
        }
    }
    out.flush()?;

    if copied != total {
        return Err(TransferError::Truncated {
            expected: total,
            copied,
        });
    }

    debug!(src = %src.display(), dst = %dst.display(), bytes = copied, "archive copied");
    on_progress(1.0);
    Ok(copied)
}
