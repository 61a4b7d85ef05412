use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// A connected duplex byte stream.
///
/// This is everything the connection layer needs from a socket: buffered
/// read and write, per-call timeouts, endpoint reporting, and close. Timeout
/// expiry must surface as [`io::ErrorKind::TimedOut`] or
/// [`io::ErrorKind::WouldBlock`] so it can be told apart from other I/O
/// failures.
pub trait Socket: Read + Write {
    /// Set the timeout applied to each subsequent physical read.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Set the timeout applied to each subsequent physical write.
    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// The local end of the stream.
    fn local_endpoint(&self) -> io::Result<Endpoint>;

    /// The remote end of the stream.
    fn peer_endpoint(&self) -> io::Result<Endpoint>;

    /// Shut the stream down in both directions and release it.
    fn close(self) -> io::Result<()>
    where
        Self: Sized;
}

/// A network family plus an address within it, e.g. `tcp:127.0.0.1:7000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    network: String,
    address: String,
}

impl Endpoint {
    pub fn new(network: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            address: address.into(),
        }
    }

    /// Network family name (`tcp`, `unix`, ...).
    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.network, self.address)
    }
}

/// Peers that already went away make shutdown report `NotConnected`; the
/// stream is released either way.
fn ignore_not_connected(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}

impl Socket for TcpStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, timeout)
    }

    fn local_endpoint(&self) -> io::Result<Endpoint> {
        Ok(Endpoint::new("tcp", self.local_addr()?.to_string()))
    }

    fn peer_endpoint(&self) -> io::Result<Endpoint> {
        Ok(Endpoint::new("tcp", self.peer_addr()?.to_string()))
    }

    fn close(self) -> io::Result<()> {
        ignore_not_connected(self.shutdown(Shutdown::Both))
    }
}

#[cfg(unix)]
impl Socket for std::os::unix::net::UnixStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        std::os::unix::net::UnixStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        std::os::unix::net::UnixStream::set_write_timeout(self, timeout)
    }

    fn local_endpoint(&self) -> io::Result<Endpoint> {
        Ok(unix_endpoint(&self.local_addr()?))
    }

    fn peer_endpoint(&self) -> io::Result<Endpoint> {
        Ok(unix_endpoint(&self.peer_addr()?))
    }

    fn close(self) -> io::Result<()> {
        ignore_not_connected(self.shutdown(Shutdown::Both))
    }
}

#[cfg(unix)]
fn unix_endpoint(addr: &std::os::unix::net::SocketAddr) -> Endpoint {
    match addr.as_pathname() {
        Some(path) => Endpoint::new("unix", path.display().to_string()),
        None => Endpoint::new("unix", "unnamed"),
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn endpoint_display_joins_network_and_address() {
        let endpoint = Endpoint::new("tcp", "192.168.1.1:80");
        assert_eq!(endpoint.to_string(), "tcp:192.168.1.1:80");
        assert_eq!(endpoint.network(), "tcp");
        assert_eq!(endpoint.address(), "192.168.1.1:80");
    }

    #[test]
    fn tcp_endpoints_are_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();

        let remote = client.peer_endpoint().unwrap();
        assert_eq!(remote.network(), "tcp");
        assert_eq!(remote.address(), addr.to_string());
        assert_eq!(
            server.peer_endpoint().unwrap(),
            client.local_endpoint().unwrap()
        );
    }

    #[test]
    fn tcp_close_is_visible_to_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (mut server, _) = listener.accept().unwrap();

        Socket::close(client).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(server.read(&mut buf).unwrap(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn unix_pair_endpoints_are_unnamed() {
        let (left, _right) = std::os::unix::net::UnixStream::pair().unwrap();
        let endpoint = left.local_endpoint().unwrap();
        assert_eq!(endpoint.to_string(), "unix:unnamed");
    }
}
