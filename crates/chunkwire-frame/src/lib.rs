//! Stream reading and writing primitives for chunkwire.
//!
//! Turns an unstructured byte stream into discrete messages and back:
//! - [`read_chunked`] reads whatever is immediately available, in 512-byte
//!   chunks, until a short read
//! - [`read_length_prefixed`] reads exactly one frame whose first two bytes
//!   (little-endian) declare the total frame length
//! - [`write_chunked`] writes a whole payload in 512-byte chunks
//!
//! None of these keep state between calls. Source and sink timeouts are
//! reported as [`FrameError::Timeout`] with the byte count reached.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    declared_length, encode_frame, frame_payload, CHUNK_SIZE, MAX_FRAME_LEN, PREFIX_SIZE,
};
pub use error::{is_timeout, FrameError, Operation, Result};
pub use reader::{read_chunked, read_length_prefixed, Framing, PartialRead, ReadResult};
pub use writer::write_chunked;
