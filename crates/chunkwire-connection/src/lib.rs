//! Message connections over a framed duplex socket.
//!
//! A [`Connection`] owns one socket and exchanges whole [`Message`]s over it
//! using the framing chosen in its [`ConnectionConfig`]. Each read and write
//! runs under its own deadline. Failures are reported as a
//! [`ConnectionError`] that says what went wrong and whether the connection
//! was closed as a result.
//!
//! ```no_run
//! use std::net::TcpStream;
//!
//! use chunkwire_connection::{Connection, ConnectionConfig, Raw};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = TcpStream::connect("127.0.0.1:7000")?;
//! let mut conn = Connection::new(stream, ConnectionConfig::default());
//!
//! conn.write(&Raw::new(&b"hello"[..]))?;
//! let mut reply = Raw::default();
//! match conn.read(&mut reply) {
//!     Err(err) if err.is_health_check() => {}
//!     other => other?,
//! }
//! conn.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod message;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod probe;

pub use config::{ConnectionConfig, DEFAULT_READ_TIMEOUT, DEFAULT_WRITE_TIMEOUT};
pub use connection::{Connection, MessageConnection};
pub use error::{BoxError, ConnectionError, MarshalError, NetworkCause, Result};
pub use message::{Json, Message, Prefixed, Raw};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockConnection;
