//! Message framing over stream sockets.
//!
//! chunkwire reads and writes whole messages over TCP or Unix-domain
//! sockets, either as 512-byte chunks ended by a short read or as frames
//! carrying a 2-byte little-endian length prefix. Every read and write runs
//! under its own deadline, and failures come back as a small error taxonomy
//! that callers can dispatch on.
//!
//! # Crate Structure
//!
//! - [`transport`]: sockets, endpoints, listeners and the per-call deadline adapter
//! - [`frame`]: chunked and length-prefixed readers, the chunked writer, prefix helpers
//! - [`connection`]: the message connection, its configuration and error taxonomy

/// Re-export transport types.
pub mod transport {
    pub use chunkwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use chunkwire_frame::*;
}

/// Re-export connection types.
pub mod connection {
    pub use chunkwire_connection::*;
}
