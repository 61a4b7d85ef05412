use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Unix domain socket transport.
///
/// Provides bind/accept/connect over filesystem-path UDS. Accepted and
/// connected streams are plain [`UnixStream`]s, which implement
/// [`Socket`](crate::Socket). The socket file is removed on `Drop` as long
/// as it is still the one this listener created.
pub struct UnixDomainSocket {
    listener: UnixListener,
    path: PathBuf,
    /// `(dev, ino)` of the socket file created by `bind`.
    identity: (u64, u64),
}

/// `sockaddr_un.sun_path` is 108 bytes on Linux and 104 elsewhere.
#[cfg(target_os = "linux")]
const MAX_PATH_LEN: usize = 108;
#[cfg(not(target_os = "linux"))]
const MAX_PATH_LEN: usize = 104;

fn bind_error(path: &Path, source: std::io::Error) -> TransportError {
    TransportError::Bind {
        address: path.display().to_string(),
        source,
    }
}

impl UnixDomainSocket {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;

    /// Bind and listen on `path` with [`Self::DEFAULT_SOCKET_MODE`].
    ///
    /// A stale socket left at `path` is removed first; any other kind of
    /// file there is an error.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        Self::bind_with_mode(path, Self::DEFAULT_SOCKET_MODE)
    }

    /// Bind and listen on `path` with an explicit permission mode.
    pub fn bind_with_mode(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let len = path.as_os_str().len();
        if len >= MAX_PATH_LEN {
            return Err(TransportError::PathTooLong {
                path,
                len,
                max: MAX_PATH_LEN,
            });
        }

        if let Ok(existing) = std::fs::symlink_metadata(&path) {
            if !existing.file_type().is_socket() {
                return Err(bind_error(
                    &path,
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "existing path is not a unix socket",
                    ),
                ));
            }
            debug!(?path, "removing stale socket");
            std::fs::remove_file(&path).map_err(|e| bind_error(&path, e))?;
        }

        let listener = UnixListener::bind(&path).map_err(|e| bind_error(&path, e))?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode))
            .map_err(|e| bind_error(&path, e))?;
        let created = std::fs::symlink_metadata(&path).map_err(|e| bind_error(&path, e))?;

        info!(?path, "listening on unix domain socket");

        Ok(Self {
            listener,
            path,
            identity: (created.dev(), created.ino()),
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(path = ?self.path, "accepted unix connection");
        Ok(stream)
    }

    /// Connect to a listening Unix domain socket (blocking).
    pub fn connect(path: impl AsRef<Path>) -> Result<UnixStream> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|e| TransportError::Connect {
            address: path.display().to_string(),
            source: e,
        })?;
        debug!(?path, "connected to unix domain socket");
        Ok(stream)
    }

    /// The path this socket is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Network family reported in listener logs.
    pub fn transport_name(&self) -> &'static str {
        "unix"
    }

    fn still_owns_path(&self) -> bool {
        std::fs::symlink_metadata(&self.path)
            .map(|m| m.file_type().is_socket() && (m.dev(), m.ino()) == self.identity)
            .unwrap_or(false)
    }
}

impl Drop for UnixDomainSocket {
    fn drop(&mut self) {
        if self.still_owns_path() {
            debug!(path = ?self.path, "cleaning up socket file");
            let _ = std::fs::remove_file(&self.path);
        } else {
            debug!(path = ?self.path, "socket path replaced or gone; skipping cleanup");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;
    use crate::socket::Socket;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chunkwire-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn bind_accept_connect_reports_endpoints() {
        let dir = temp_dir("uds-roundtrip");
        let sock_path = dir.join("test.sock");

        let listener = UnixDomainSocket::bind(&sock_path).unwrap();
        assert!(sock_path.exists());

        let path_clone = sock_path.clone();
        let handle = std::thread::spawn(move || {
            let mut client = UnixDomainSocket::connect(&path_clone).unwrap();
            let remote = client.peer_endpoint().unwrap();
            client.write_all(b"hello").unwrap();
            remote
        });

        let mut server = listener.accept().unwrap();
        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        assert_eq!(
            server.local_endpoint().unwrap().address(),
            sock_path.display().to_string()
        );

        let remote = handle.join().unwrap();
        assert_eq!(remote.network(), "unix");
        assert_eq!(remote.address(), sock_path.display().to_string());

        drop(listener);
        assert!(!sock_path.exists(), "socket file should be removed on drop");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn path_too_long_is_rejected() {
        let long_path = "/tmp/".to_string() + &"a".repeat(200) + ".sock";
        let result = UnixDomainSocket::bind(&long_path);
        assert!(matches!(result, Err(TransportError::PathTooLong { .. })));
    }

    #[test]
    fn default_mode_is_owner_only() {
        let dir = temp_dir("uds-perms");
        let sock_path = dir.join("perm.sock");

        let listener = UnixDomainSocket::bind(&sock_path).unwrap();
        let mode = std::fs::metadata(&sock_path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        drop(listener);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn stale_socket_is_replaced_but_regular_file_is_not() {
        let dir = temp_dir("uds-stale");
        let sock_path = dir.join("stale.sock");

        let first = UnixDomainSocket::bind(&sock_path).unwrap();
        std::mem::forget(first);
        let second = UnixDomainSocket::bind(&sock_path);
        assert!(second.is_ok());
        drop(second);

        let file_path = dir.join("not-a-socket.sock");
        std::fs::write(&file_path, b"regular-file").unwrap();
        let result = UnixDomainSocket::bind(&file_path);
        assert!(matches!(result, Err(TransportError::Bind { .. })));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn drop_leaves_replaced_path_alone() {
        let dir = temp_dir("uds-drop-race");
        let sock_path = dir.join("drop.sock");

        let listener = UnixDomainSocket::bind(&sock_path).unwrap();
        std::fs::remove_file(&sock_path).unwrap();
        std::fs::write(&sock_path, b"replacement-file").unwrap();

        drop(listener);
        assert!(sock_path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
