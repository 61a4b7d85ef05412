use std::io::{ErrorKind, Write};

use tracing::trace;

use crate::codec::CHUNK_SIZE;
use crate::error::{is_timeout, FrameError, Operation, Result};

/// Write all of `data` to `sink` in [`CHUNK_SIZE`] pieces.
///
/// Partial writes are resumed from the first unconfirmed byte. Success means
/// every byte was accepted. On failure the error reports how many bytes had
/// been confirmed: a sink timeout becomes [`FrameError::Timeout`], a write
/// that accepts nothing becomes [`FrameError::WriteZero`], and anything else
/// becomes [`FrameError::Write`].
pub fn write_chunked<W: Write + ?Sized>(sink: &mut W, data: &[u8]) -> Result<()> {
    let mut sent = 0usize;

    while sent < data.len() {
        let end = (sent + CHUNK_SIZE).min(data.len());
        match sink.write(&data[sent..end]) {
            Ok(0) => return Err(FrameError::WriteZero { sent }),
            Ok(n) => {
                sent += n;
                trace!(wrote = n, sent, total = data.len(), "chunk written");
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(classify_write_error(err, sent)),
        }
    }

    loop {
        match sink.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(classify_write_error(err, sent)),
        }
    }
}

fn classify_write_error(err: std::io::Error, sent: usize) -> FrameError {
    if is_timeout(&err) {
        FrameError::Timeout {
            operation: Operation::Write,
            bytes: sent,
        }
    } else {
        FrameError::Write { sent, source: err }
    }
}
