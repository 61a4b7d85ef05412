use std::time::Duration;

use chunkwire_frame::Framing;

/// Default per-call read deadline.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Default per-call write deadline.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed settings for one [`Connection`](crate::Connection).
///
/// The timeouts are re-armed independently on every read and every write;
/// they are not a connection lifetime. A zero timeout expires immediately;
/// `Duration::MAX` never expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub framing: Framing,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl ConnectionConfig {
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            framing: Framing::Chunked,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let cfg = ConnectionConfig::default()
            .with_framing(Framing::LengthPrefixed)
            .with_read_timeout(Duration::from_millis(250))
            .with_write_timeout(Duration::from_secs(2));

        assert_eq!(cfg.framing, Framing::LengthPrefixed);
        assert_eq!(cfg.read_timeout, Duration::from_millis(250));
        assert_eq!(cfg.write_timeout, Duration::from_secs(2));
        assert_eq!(ConnectionConfig::default().framing, Framing::Chunked);
    }
}
