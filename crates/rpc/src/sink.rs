//! Byte-transparent copy of a hook script body into the controller's sink

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::Path;

use pacshim_errors::{Error, SinkOpenError};
use tracing::debug;

/// Default copy chunk size. Tuning only; correctness does not depend
/// on it.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Copy `source` into the sink at `sink_path` until EOF, then close
/// the sink. Closing happens on every exit path, including errors
/// mid-copy, so the controller always observes end-of-input.
///
/// Returns the number of bytes copied.
pub fn relay<R: Read>(mut source: R, sink_path: &Path, chunk_size: usize) -> Result<u64, Error> {
    let mut sink = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(sink_path)
        .map_err(|e| SinkOpenError::Open {
            path: sink_path.display().to_string(),
            message: e.to_string(),
        })?;

    let mut buf = vec![0; chunk_size.max(1)];
    let mut copied = 0u64;
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::internal(format!("hook source read failed: {e}"))),
        };
        sink.write_all(&buf[..n])
            .map_err(|e| Error::internal(format!("hook sink write failed: {e}")))?;
        copied += n as u64;
    }

    debug!(sink = %sink_path.display(), copied, "hook body relayed");
    Ok(copied)
}
