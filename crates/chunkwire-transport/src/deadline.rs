use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use crate::socket::Socket;

/// An armed, absolute time limit for one logical read or write call.
///
/// Socket timeouts apply per physical operation; a call that loops over
/// several physical reads would otherwise get a fresh timeout on each one.
/// `Deadline` fixes the expiry instant when it is armed and, before every
/// physical read or write, narrows the socket timeout to the time that is
/// left. Once the instant has passed, I/O fails with
/// [`io::ErrorKind::TimedOut`] without touching the socket.
///
/// A deadline cannot be extended or cancelled after it is armed; drop it and
/// arm a new one for the next call. A timeout too large to represent as an
/// instant (such as `Duration::MAX`) never expires.
pub struct Deadline<'a, S> {
    socket: &'a mut S,
    expires_at: Option<Instant>,
}

impl<'a, S: Socket> Deadline<'a, S> {
    /// Arm a deadline `timeout` from now over `socket`.
    pub fn arm(socket: &'a mut S, timeout: Duration) -> Self {
        Self {
            socket,
            expires_at: Instant::now().checked_add(timeout),
        }
    }

    /// Time left before expiry, `None` if unbounded, or `TimedOut` once it
    /// has passed.
    pub fn remaining(&self) -> io::Result<Option<Duration>> {
        let Some(expires_at) = self.expires_at else {
            return Ok(None);
        };
        let now = Instant::now();
        if now >= expires_at {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "deadline exceeded",
            ));
        }
        Ok(Some(expires_at - now))
    }

    /// The expiry instant, or `None` for a deadline that never expires.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }
}

impl<S: Socket> Read for Deadline<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining()?;
        self.socket.set_read_timeout(remaining)?;
        self.socket.read(buf)
    }
}

impl<S: Socket> Write for Deadline<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let remaining = self.remaining()?;
        self.socket.set_write_timeout(remaining)?;
        self.socket.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.socket.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::socket::Endpoint;

    #[derive(Default)]
    struct RecordingSocket {
        read_timeouts: RefCell<Vec<Option<Duration>>>,
        write_timeouts: RefCell<Vec<Option<Duration>>>,
        written: Vec<u8>,
    }

    impl Read for RecordingSocket {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            buf[0] = 7;
            Ok(1)
        }
    }

    impl Write for RecordingSocket {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Socket for RecordingSocket {
        fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
            self.read_timeouts.borrow_mut().push(timeout);
            Ok(())
        }

        fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
            self.write_timeouts.borrow_mut().push(timeout);
            Ok(())
        }

        fn local_endpoint(&self) -> io::Result<Endpoint> {
            Ok(Endpoint::new("mock", "local"))
        }

        fn peer_endpoint(&self) -> io::Result<Endpoint> {
            Ok(Endpoint::new("mock", "remote"))
        }

        fn close(self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn read_narrows_timeout_to_remaining_time() {
        let mut socket = RecordingSocket::default();
        let timeout = Duration::from_secs(5);
        {
            let mut deadline = Deadline::arm(&mut socket, timeout);
            let mut buf = [0u8; 4];
            assert_eq!(deadline.read(&mut buf).unwrap(), 1);
            assert_eq!(deadline.read(&mut buf).unwrap(), 1);
        }

        let recorded = socket.read_timeouts.borrow();
        assert_eq!(recorded.len(), 2);
        let first = recorded[0].unwrap();
        let second = recorded[1].unwrap();
        assert!(first <= timeout);
        assert!(second <= first);
        assert!(socket.write_timeouts.borrow().is_empty());
    }

    #[test]
    fn write_uses_write_timeout() {
        let mut socket = RecordingSocket::default();
        {
            let mut deadline = Deadline::arm(&mut socket, Duration::from_secs(5));
            deadline.write_all(b"abc").unwrap();
            deadline.flush().unwrap();
        }
        assert_eq!(socket.written, b"abc");
        assert_eq!(socket.write_timeouts.borrow().len(), 1);
        assert!(socket.read_timeouts.borrow().is_empty());
    }

    #[test]
    fn expired_deadline_times_out_without_io() {
        let mut socket = RecordingSocket::default();
        let mut deadline = Deadline::arm(&mut socket, Duration::ZERO);

        let mut buf = [0u8; 4];
        let err = deadline.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        let err = deadline.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);

        drop(deadline);
        assert!(socket.read_timeouts.borrow().is_empty());
        assert!(socket.written.is_empty());
    }

    #[test]
    fn unrepresentable_timeout_never_expires() {
        let mut socket = RecordingSocket::default();
        {
            let mut deadline = Deadline::arm(&mut socket, Duration::MAX);
            assert!(deadline.expires_at().is_none());
            assert_eq!(deadline.remaining().unwrap(), None);

            let mut buf = [0u8; 4];
            assert_eq!(deadline.read(&mut buf).unwrap(), 1);
            deadline.write_all(b"ok").unwrap();
        }
        assert_eq!(*socket.read_timeouts.borrow(), vec![None]);
        assert_eq!(*socket.write_timeouts.borrow(), vec![None]);

        let deadline = Deadline::arm(&mut socket, Duration::from_secs(u64::MAX));
        assert!(deadline.expires_at().is_none());
    }

    #[test]
    #[cfg(unix)]
    fn real_socket_read_times_out() {
        let (mut left, _right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut deadline = Deadline::arm(&mut left, Duration::from_millis(20));

        let mut buf = [0u8; 4];
        let err = deadline.read(&mut buf).unwrap_err();
        assert!(matches!(
            err.kind(),
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
        ));
    }
}
