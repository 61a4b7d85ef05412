use std::io;

use chunkwire_frame::{FrameError, Operation};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A message could not be encoded or decoded.
///
/// Never implies anything about the transport; the connection stays usable.
#[derive(Debug, thiserror::Error)]
#[error("{inner}")]
pub struct MarshalError {
    #[source]
    inner: BoxError,
}

impl MarshalError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self { inner: err.into() }
    }

    pub fn into_inner(self) -> BoxError {
        self.inner
    }
}

impl From<serde_json::Error> for MarshalError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err)
    }
}

impl From<FrameError> for MarshalError {
    fn from(err: FrameError) -> Self {
        Self::new(err)
    }
}

/// Why a [`ConnectionError::Network`] was raised.
#[derive(Debug, thiserror::Error)]
pub enum NetworkCause {
    /// `read` was called after the connection was closed.
    #[error("read called on closed connection")]
    ReadOnClosed,

    /// `write` was called after the connection was closed.
    #[error("write called on closed connection")]
    WriteOnClosed,

    /// The peer ended the stream without sending anything.
    #[error("peer disconnected prior to sending data")]
    DisconnectNoData,

    /// The peer sent monitoring traffic rather than a message.
    #[error("health check errors should be ignored")]
    HealthCheck,

    /// Reading or writing the stream failed.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Releasing the socket failed.
    #[error("close failed: {0}")]
    Close(#[source] io::Error),
}

/// Errors produced by a [`Connection`](crate::Connection).
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// A transport-level condition, tagged with the connection descriptor.
    ///
    /// Stream failures (`Frame` causes, including timeouts and end-of-stream)
    /// have already closed the connection when this is returned. The
    /// remaining causes leave its state untouched.
    #[error("network error ({descriptor}): {cause}")]
    Network {
        descriptor: String,
        #[source]
        cause: NetworkCause,
    },

    /// The payload could not be encoded or decoded.
    #[error("marshal error: {0}")]
    Marshal(#[from] MarshalError),
}

impl ConnectionError {
    pub(crate) fn network(descriptor: &str, cause: NetworkCause) -> Self {
        ConnectionError::Network {
            descriptor: descriptor.to_string(),
            cause,
        }
    }

    pub fn cause(&self) -> Option<&NetworkCause> {
        match self {
            ConnectionError::Network { cause, .. } => Some(cause),
            ConnectionError::Marshal(_) => None,
        }
    }

    /// Descriptor of the connection that produced a network error.
    pub fn descriptor(&self) -> Option<&str> {
        match self {
            ConnectionError::Network { descriptor, .. } => Some(descriptor),
            ConnectionError::Marshal(_) => None,
        }
    }

    /// Monitoring traffic; safe to log and ignore.
    pub fn is_health_check(&self) -> bool {
        matches!(self.cause(), Some(NetworkCause::HealthCheck))
    }

    pub fn is_disconnect(&self) -> bool {
        matches!(self.cause(), Some(NetworkCause::DisconnectNoData))
    }

    pub fn is_marshal(&self) -> bool {
        matches!(self, ConnectionError::Marshal(_))
    }

    /// The operation was attempted on an already-closed connection.
    pub fn is_closed_precondition(&self) -> bool {
        matches!(
            self.cause(),
            Some(NetworkCause::ReadOnClosed | NetworkCause::WriteOnClosed)
        )
    }

    /// Operation and byte count of an expired deadline.
    pub fn timeout(&self) -> Option<(Operation, usize)> {
        match self.cause() {
            Some(NetworkCause::Frame(FrameError::Timeout { operation, bytes })) => {
                Some((*operation, *bytes))
            }
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.timeout().is_some()
    }

    /// Whether the connection was closed when this error was produced.
    pub fn closes_connection(&self) -> bool {
        matches!(
            self.cause(),
            Some(NetworkCause::Frame(_) | NetworkCause::DisconnectNoData)
        )
    }
}

pub type Result<T> = std::result::Result<T, ConnectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = "Connection(Local: 'tcp:127.0.0.1:1' Remote: 'tcp:127.0.0.1:2')";

    #[test]
    fn network_error_message_carries_descriptor() {
        let err = ConnectionError::network(DESCRIPTOR, NetworkCause::ReadOnClosed);
        assert_eq!(
            err.to_string(),
            format!("network error ({DESCRIPTOR}): read called on closed connection")
        );
        assert_eq!(err.descriptor(), Some(DESCRIPTOR));
        assert!(err.is_closed_precondition());
        assert!(!err.closes_connection());
    }

    #[test]
    fn timeout_is_exposed_with_operation_and_bytes() {
        let err = ConnectionError::network(
            DESCRIPTOR,
            NetworkCause::Frame(FrameError::Timeout {
                operation: Operation::Read,
                bytes: 42,
            }),
        );
        assert_eq!(err.timeout(), Some((Operation::Read, 42)));
        assert!(err.closes_connection());
        assert!(err
            .to_string()
            .ends_with("timeout occurred after READ of 42 bytes"));
    }

    #[test]
    fn marshal_error_has_no_descriptor() {
        let err = ConnectionError::from(MarshalError::new("bad payload"));
        assert!(err.is_marshal());
        assert_eq!(err.descriptor(), None);
        assert_eq!(err.to_string(), "marshal error: bad payload");
    }

    #[test]
    fn health_check_and_disconnect_predicates() {
        let health = ConnectionError::network(DESCRIPTOR, NetworkCause::HealthCheck);
        assert!(health.is_health_check());
        assert!(!health.closes_connection());

        let gone = ConnectionError::network(DESCRIPTOR, NetworkCause::DisconnectNoData);
        assert!(gone.is_disconnect());
        assert!(gone.closes_connection());
    }
}
