use std::fmt;
use std::io::{ErrorKind, Read};
use std::str::FromStr;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::codec::{declared_length, CHUNK_SIZE};
use crate::error::{is_timeout, FrameError, Operation};

/// Bytes captured by a read call that ended on an error.
///
/// End-of-stream is reported this way too, so the bytes that arrived before
/// it are never lost; the caller decides whether they are usable.
#[derive(Debug, thiserror::Error)]
#[error("{source} ({captured} bytes captured)", captured = .data.len())]
pub struct PartialRead {
    pub data: Bytes,
    #[source]
    pub source: FrameError,
}

impl PartialRead {
    fn new(data: BytesMut, source: FrameError) -> Self {
        Self {
            data: data.freeze(),
            source,
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.source.is_end_of_stream()
    }

    pub fn into_parts(self) -> (Bytes, FrameError) {
        (self.data, self.source)
    }
}

pub type ReadResult = std::result::Result<Bytes, PartialRead>;

enum Chunk {
    Data(usize),
    End,
    Failed(FrameError),
}

/// One physical read, retrying interrupts and classifying failures.
fn read_chunk<R: Read + ?Sized>(src: &mut R, buf: &mut [u8], captured: usize) -> Chunk {
    loop {
        match src.read(buf) {
            Ok(0) => return Chunk::End,
            Ok(n) => return Chunk::Data(n),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Chunk::End,
            Err(err) if is_timeout(&err) => {
                return Chunk::Failed(FrameError::Timeout {
                    operation: Operation::Read,
                    bytes: captured,
                })
            }
            Err(err) => return Chunk::Failed(FrameError::Io(err)),
        }
    }
}

/// Read whatever the source has immediately available.
///
/// Fills [`CHUNK_SIZE`] buffers until one comes back short. Reaching
/// end-of-stream or any error stops the loop and is returned together with
/// every byte captured so far. A source timeout becomes
/// [`FrameError::Timeout`] carrying the captured byte count.
pub fn read_chunked<R: Read + ?Sized>(src: &mut R) -> ReadResult {
    let mut received = BytesMut::new();
    let mut chunk = [0u8; CHUNK_SIZE];

    loop {
        match read_chunk(src, &mut chunk, received.len()) {
            Chunk::Data(n) => {
                received.extend_from_slice(&chunk[..n]);
                trace!(read = n, total = received.len(), "chunk read");
                if n < CHUNK_SIZE {
                    return Ok(received.freeze());
                }
            }
            Chunk::End => return Err(PartialRead::new(received, FrameError::EndOfStream)),
            Chunk::Failed(err) => return Err(PartialRead::new(received, err)),
        }
    }
}

/// Read one length-prefixed frame.
///
/// The first two bytes (little-endian) declare the total frame length,
/// prefix included. The length is decoded once, as soon as two bytes are in
/// hand, however the source splits its deliveries. Reading stops when the
/// declared length is reached or the stream ends. The returned frame is cut
/// to the declared length; anything read past it (such as the start of a
/// pipelined next frame) is dropped.
pub fn read_length_prefixed<R: Read + ?Sized>(src: &mut R) -> ReadResult {
    let mut received = BytesMut::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut declared: Option<usize> = None;

    let outcome = loop {
        match read_chunk(src, &mut chunk, received.len()) {
            Chunk::Data(n) => {
                received.extend_from_slice(&chunk[..n]);
                if declared.is_none() {
                    declared = declared_length(&received);
                }
                trace!(read = n, total = received.len(), ?declared, "prefixed chunk read");
                if declared.is_some_and(|len| received.len() >= len) {
                    break Ok(());
                }
            }
            Chunk::End => break Err(FrameError::EndOfStream),
            Chunk::Failed(err) => break Err(err),
        }
    };

    if let Some(len) = declared {
        if len < received.len() {
            trace!(declared = len, dropped = received.len() - len, "truncating overrun");
            received.truncate(len);
        }
    }

    match outcome {
        Ok(()) => Ok(received.freeze()),
        Err(err) => Err(PartialRead::new(received, err)),
    }
}

/// How a connection finds message boundaries in the byte stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    /// A message is whatever arrives before a short read.
    #[default]
    Chunked,
    /// A message is one frame with a 2-byte little-endian length prefix.
    LengthPrefixed,
}

impl Framing {
    /// Read one message from `src` using this framing.
    pub fn read<R: Read + ?Sized>(self, src: &mut R) -> ReadResult {
        match self {
            Framing::Chunked => read_chunked(src),
            Framing::LengthPrefixed => read_length_prefixed(src),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Framing::Chunked => "chunked",
            Framing::LengthPrefixed => "prefixed",
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chunked" => Ok(Framing::Chunked),
            "prefixed" | "length-prefixed" => Ok(Framing::LengthPrefixed),
            other => Err(format!(
                "unknown framing '{other}' (expected 'chunked' or 'prefixed')"
            )),
        }
    }
}
