use chunkwire_frame::write_chunked;
use chunkwire_transport::{Deadline, Socket};
use tracing::{debug, warn};

use crate::config::ConnectionConfig;
use crate::error::{ConnectionError, NetworkCause, Result};
use crate::message::Message;
use crate::probe::is_health_check;

/// Two-way exchange of whole messages.
///
/// Implemented by [`Connection`] and, for tests of code built on top of it,
/// by `MockConnection` (behind the `mock` feature).
pub trait MessageConnection {
    /// Read one message and decode it into `target`.
    fn read(&mut self, target: &mut dyn Message) -> Result<()>;

    /// Encode `source` and write it.
    fn write(&mut self, source: &dyn Message) -> Result<()>;

    /// Release the connection. Later calls are no-ops.
    fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;

    /// Human-readable description of both endpoints.
    fn descriptor(&self) -> &str;
}

enum State<S> {
    Open(S),
    Closed,
}

/// A message connection over an exclusively owned socket.
///
/// Every read and write arms its own deadline from [`ConnectionConfig`].
/// Failures that mean the stream is broken (I/O errors, timeouts,
/// end-of-stream) close the connection before the error is returned; bad
/// payloads and health checks leave it open.
///
/// There is no internal locking. One caller drives a connection at a time.
pub struct Connection<S> {
    state: State<S>,
    config: ConnectionConfig,
    descriptor: String,
}

impl<S: Socket> Connection<S> {
    pub fn new(socket: S, config: ConnectionConfig) -> Self {
        let descriptor = describe(&socket);
        debug!(%descriptor, framing = %config.framing, "connection opened");
        Self {
            state: State::Open(socket),
            config,
            descriptor,
        }
    }

    /// Read one message into `target`.
    ///
    /// Returns `Network(HealthCheck)` without closing when the peer sent
    /// monitoring traffic, and `Marshal` without closing when the payload
    /// does not decode. If the stream ended after some bytes arrived, the
    /// connection is closed but those bytes are still classified and decoded.
    pub fn read<M: Message + ?Sized>(&mut self, target: &mut M) -> Result<()> {
        let State::Open(socket) = &mut self.state else {
            return Err(ConnectionError::network(
                &self.descriptor,
                NetworkCause::ReadOnClosed,
            ));
        };

        let outcome = {
            let mut deadline = Deadline::arm(socket, self.config.read_timeout);
            self.config.framing.read(&mut deadline)
        };

        let payload = match outcome {
            Ok(data) => data,
            Err(partial) if partial.is_end_of_stream() => {
                self.release("end of stream");
                if partial.data.is_empty() {
                    return Err(ConnectionError::network(
                        &self.descriptor,
                        NetworkCause::DisconnectNoData,
                    ));
                }
                partial.data
            }
            Err(partial) => {
                let (_, cause) = partial.into_parts();
                self.release("read failed");
                return Err(ConnectionError::network(&self.descriptor, cause.into()));
            }
        };

        if is_health_check(&payload) {
            debug!(descriptor = %self.descriptor, bytes = payload.len(), "health check traffic");
            return Err(ConnectionError::network(
                &self.descriptor,
                NetworkCause::HealthCheck,
            ));
        }

        target.decode(&payload)?;
        Ok(())
    }

    /// Encode `source` and write all of it.
    ///
    /// An encode failure returns `Marshal` before the socket is touched.
    pub fn write<M: Message + ?Sized>(&mut self, source: &M) -> Result<()> {
        let State::Open(socket) = &mut self.state else {
            return Err(ConnectionError::network(
                &self.descriptor,
                NetworkCause::WriteOnClosed,
            ));
        };

        let data = source.encode()?;

        let outcome = {
            let mut deadline = Deadline::arm(socket, self.config.write_timeout);
            write_chunked(&mut deadline, &data)
        };

        if let Err(err) = outcome {
            self.release("write failed");
            return Err(ConnectionError::network(&self.descriptor, err.into()));
        }
        Ok(())
    }

    /// Close the socket. Idempotent; only the first call can fail.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Closed => Ok(()),
            State::Open(socket) => {
                debug!(descriptor = %self.descriptor, "closing connection");
                socket.close().map_err(|err| {
                    ConnectionError::network(&self.descriptor, NetworkCause::Close(err))
                })
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Borrow the socket while the connection is open.
    pub fn socket(&self) -> Option<&S> {
        match &self.state {
            State::Open(socket) => Some(socket),
            State::Closed => None,
        }
    }

    /// Close after a fatal stream condition. The caller returns the stream
    /// error, so a close failure here is only logged.
    fn release(&mut self, reason: &'static str) {
        if let State::Open(socket) = std::mem::replace(&mut self.state, State::Closed) {
            debug!(descriptor = %self.descriptor, reason, "closing connection");
            if let Err(err) = socket.close() {
                warn!(descriptor = %self.descriptor, error = %err, "close after {reason} failed");
            }
        }
    }
}

impl<S: Socket> MessageConnection for Connection<S> {
    fn read(&mut self, target: &mut dyn Message) -> Result<()> {
        Connection::read(self, target)
    }

    fn write(&mut self, source: &dyn Message) -> Result<()> {
        Connection::write(self, source)
    }

    fn close(&mut self) -> Result<()> {
        Connection::close(self)
    }

    fn is_closed(&self) -> bool {
        Connection::is_closed(self)
    }

    fn descriptor(&self) -> &str {
        Connection::descriptor(self)
    }
}

impl<S> std::fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("descriptor", &self.descriptor)
            .field("closed", &matches!(self.state, State::Closed))
            .field("config", &self.config)
            .finish()
    }
}

fn describe<S: Socket>(socket: &S) -> String {
    let local = socket
        .local_endpoint()
        .map(|e| e.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let remote = socket
        .peer_endpoint()
        .map(|e| e.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("Connection(Local: '{local}' Remote: '{remote}')")
}
