use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// TCP listener transport.
///
/// Binds a listening socket and hands out connected [`TcpStream`]s, which
/// implement [`Socket`](crate::Socket) and can be wrapped by the connection
/// layer directly.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `addr` (use port 0 for an ephemeral port).
    pub fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|source| TransportError::Bind {
            address: addr.to_string(),
            source,
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| TransportError::Bind {
                address: addr.to_string(),
                source,
            })?;

        info!(%local_addr, "listening on tcp");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<TcpStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted tcp connection");
        Ok(stream)
    }

    /// Connect to a listening TCP endpoint (blocking).
    ///
    /// Every resolved address is tried in order until one succeeds.
    pub fn connect(addr: &str) -> Result<TcpStream> {
        Self::connect_inner(addr, None)
    }

    /// Connect, giving up on each resolved address after `timeout`.
    pub fn connect_timeout(addr: &str, timeout: Duration) -> Result<TcpStream> {
        Self::connect_inner(addr, Some(timeout))
    }

    fn connect_inner(addr: &str, timeout: Option<Duration>) -> Result<TcpStream> {
        let resolved = addr
            .to_socket_addrs()
            .map_err(|source| TransportError::Connect {
                address: addr.to_string(),
                source,
            })?;

        let mut last_err = None;
        for socket_addr in resolved {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(&socket_addr, timeout),
                None => TcpStream::connect(socket_addr),
            };
            match attempt {
                Ok(stream) => {
                    debug!(%socket_addr, "connected over tcp");
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }

        Err(TransportError::Connect {
            address: addr.to_string(),
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    "address resolved to nothing",
                )
            }),
        })
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Network family reported in listener logs.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}
