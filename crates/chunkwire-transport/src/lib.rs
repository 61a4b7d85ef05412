//! Duplex socket abstraction for chunkwire.
//!
//! This is the lowest layer. It defines the [`Socket`] trait the connection
//! layer consumes, implements it for TCP and Unix domain streams, and
//! provides [`Deadline`], which turns per-operation socket timeouts into a
//! single absolute limit for one logical read or write call.

pub mod deadline;
pub mod error;
pub mod socket;
pub mod tcp;

#[cfg(unix)]
pub mod uds;

pub use deadline::Deadline;
pub use error::{Result, TransportError};
pub use socket::{Endpoint, Socket};
pub use tcp::TcpTransport;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
