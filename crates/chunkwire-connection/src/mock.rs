//! In-memory [`MessageConnection`] for tests.

use std::collections::VecDeque;

use crate::connection::MessageConnection;
use crate::error::{ConnectionError, NetworkCause, Result};
use crate::message::Message;
use crate::probe::is_health_check;

const MOCK_DESCRIPTOR: &str = "Connection(Local: 'mock:local' Remote: 'mock:remote')";

/// Scripted connection: reads are served from a queue, writes are recorded.
///
/// Reads follow the same rules as a real connection. Queued payloads that
/// look like health checks yield `HealthCheck`, and an empty queue behaves
/// like a peer that hung up without sending anything.
#[derive(Debug)]
pub struct MockConnection {
    reads: VecDeque<std::result::Result<Vec<u8>, NetworkCause>>,
    write_errors: VecDeque<NetworkCause>,
    written: Vec<Vec<u8>>,
    closed: bool,
    descriptor: String,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            reads: VecDeque::new(),
            write_errors: VecDeque::new(),
            written: Vec::new(),
            closed: false,
            descriptor: MOCK_DESCRIPTOR.to_string(),
        }
    }

    pub fn with_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.descriptor = descriptor.into();
        self
    }

    /// Queue a payload for the next read.
    pub fn push_read(&mut self, payload: impl Into<Vec<u8>>) -> &mut Self {
        self.reads.push_back(Ok(payload.into()));
        self
    }

    /// Queue a failure for the next read. Like a real stream failure, it
    /// closes the connection.
    pub fn push_read_error(&mut self, cause: NetworkCause) -> &mut Self {
        self.reads.push_back(Err(cause));
        self
    }

    /// Fail the next write with `cause` and close the connection.
    pub fn push_write_error(&mut self, cause: NetworkCause) -> &mut Self {
        self.write_errors.push_back(cause);
        self
    }

    /// Encoded payloads accepted so far, oldest first.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    fn fail(&self, cause: NetworkCause) -> ConnectionError {
        ConnectionError::network(&self.descriptor, cause)
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageConnection for MockConnection {
    fn read(&mut self, target: &mut dyn Message) -> Result<()> {
        if self.closed {
            return Err(self.fail(NetworkCause::ReadOnClosed));
        }
        match self.reads.pop_front() {
            None => {
                self.closed = true;
                Err(self.fail(NetworkCause::DisconnectNoData))
            }
            Some(Err(cause)) => {
                self.closed = true;
                Err(self.fail(cause))
            }
            Some(Ok(payload)) if is_health_check(&payload) => {
                Err(self.fail(NetworkCause::HealthCheck))
            }
            Some(Ok(payload)) => Ok(target.decode(&payload)?),
        }
    }

    fn write(&mut self, source: &dyn Message) -> Result<()> {
        if self.closed {
            return Err(self.fail(NetworkCause::WriteOnClosed));
        }
        let data = source.encode()?;
        if let Some(cause) = self.write_errors.pop_front() {
            self.closed = true;
            return Err(self.fail(cause));
        }
        self.written.push(data);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn descriptor(&self) -> &str {
        &self.descriptor
    }
}
