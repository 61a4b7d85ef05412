use std::fmt;
use std::io;

/// Which direction of I/O an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Read => "READ",
            Operation::Write => "WRITE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while moving bytes on or off a stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The source or sink timed out. `bytes` is how much had been read or
    /// confirmed written before expiry.
    #[error("timeout occurred after {operation} of {bytes} bytes")]
    Timeout { operation: Operation, bytes: usize },

    /// The source reached end-of-stream.
    #[error("end of stream")]
    EndOfStream,

    /// The sink accepted nothing and reported no error.
    #[error("write failed, no bytes written (after {sent} bytes)")]
    WriteZero { sent: usize },

    /// The sink failed after `sent` bytes were confirmed.
    #[error("write failed after {sent} bytes: {source}")]
    Write { sent: usize, source: io::Error },

    /// Any other I/O error on the source.
    #[error("frame I/O error: {0}")]
    Io(#[from] io::Error),

    /// A frame does not fit in the 2-byte length prefix.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// A frame's declared length disagrees with the bytes present.
    #[error("malformed frame: declared {declared} bytes, have {actual}")]
    Malformed { declared: usize, actual: usize },
}

impl FrameError {
    /// True when the source or sink timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FrameError::Timeout { .. })
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, FrameError::EndOfStream)
    }

    /// Bytes transferred before the failure, when the error tracks it.
    pub fn bytes_transferred(&self) -> Option<usize> {
        match self {
            FrameError::Timeout { bytes, .. } => Some(*bytes),
            FrameError::WriteZero { sent } | FrameError::Write { sent, .. } => Some(*sent),
            _ => None,
        }
    }
}

/// Whether an I/O error means a socket timeout expired.
///
/// Std sockets report an expired `SO_RCVTIMEO`/`SO_SNDTIMEO` as
/// `WouldBlock` on Unix and `TimedOut` on Windows.
pub fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

pub type Result<T> = std::result::Result<T, FrameError>;
