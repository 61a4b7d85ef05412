use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Capacity of every physical read or write buffer.
pub const CHUNK_SIZE: usize = 512;

/// Size of the little-endian length prefix.
pub const PREFIX_SIZE: usize = 2;

/// Largest total frame length a 2-byte prefix can declare.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Decode the declared total frame length, prefix included.
///
/// Returns `None` until at least [`PREFIX_SIZE`] bytes are available.
pub fn declared_length(bytes: &[u8]) -> Option<usize> {
    match bytes {
        [lo, hi, ..] => Some(u16::from_le_bytes([*lo, *hi]) as usize),
        _ => None,
    }
}

/// Encode `payload` as a length-prefixed frame.
///
/// Wire format:
/// ```text
/// ┌────────────────────┬──────────────────────────┐
/// │ Length (2B LE)     │ Payload                  │
/// │ prefix + payload   │ (Length - 2 bytes)       │
/// └────────────────────┴──────────────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let total = PREFIX_SIZE + payload.len();
    if total > MAX_FRAME_LEN {
        return Err(FrameError::FrameTooLarge {
            size: total,
            max: MAX_FRAME_LEN,
        });
    }
    dst.reserve(total);
    dst.put_u16_le(total as u16);
    dst.put_slice(payload);
    Ok(())
}

/// Validate a complete length-prefixed frame and borrow its payload.
pub fn frame_payload(frame: &[u8]) -> Result<&[u8]> {
    let declared = declared_length(frame).ok_or(FrameError::Malformed {
        declared: 0,
        actual: frame.len(),
    })?;
    if declared < PREFIX_SIZE || declared > frame.len() {
        return Err(FrameError::Malformed {
            declared,
            actual: frame.len(),
        });
    }
    Ok(&frame[PREFIX_SIZE..declared])
}
