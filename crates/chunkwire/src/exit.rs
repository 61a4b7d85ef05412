use std::fmt;
use std::io;

use chunkwire_connection::{ConnectionError, NetworkCause};
use chunkwire_frame::FrameError;
use chunkwire_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(&err), format!("{context}: {err}"))
}

fn io_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    }
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn connection_error(context: &str, err: ConnectionError) -> CliError {
    let code = match err.cause() {
        None => DATA_INVALID,
        Some(NetworkCause::HealthCheck) => HEALTH_CHECK_FAILED,
        Some(NetworkCause::Frame(FrameError::Timeout { .. })) => TIMEOUT,
        Some(NetworkCause::Frame(FrameError::Io(source)))
        | Some(NetworkCause::Frame(FrameError::Write { source, .. }))
        | Some(NetworkCause::Close(source)) => io_code(source),
        Some(NetworkCause::Frame(
            FrameError::FrameTooLarge { .. } | FrameError::Malformed { .. },
        )) => DATA_INVALID,
        Some(_) => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}
