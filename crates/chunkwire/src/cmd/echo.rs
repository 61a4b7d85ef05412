use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chunkwire_connection::{
    Connection, ConnectionConfig, ConnectionError, MessageConnection, Raw,
};
use chunkwire_transport::TcpTransport;
#[cfg(unix)]
use chunkwire_transport::UnixDomainSocket;

use crate::cmd::{EchoArgs, Target};
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::OutputFormat;

enum Listener {
    Tcp(TcpTransport),
    #[cfg(unix)]
    Unix(UnixDomainSocket),
}

impl Listener {
    fn bind(target: &Target) -> CliResult<Self> {
        match target {
            Target::Tcp(addr) => TcpTransport::bind(addr)
                .map(Listener::Tcp)
                .map_err(|err| transport_error("bind failed", err)),
            #[cfg(unix)]
            Target::Unix(path) => UnixDomainSocket::bind(path)
                .map(Listener::Unix)
                .map_err(|err| transport_error("bind failed", err)),
            #[cfg(not(unix))]
            Target::Unix(_) => Err(CliError::new(
                crate::exit::USAGE,
                "unix sockets are not supported on this platform",
            )),
        }
    }

    fn local(&self) -> String {
        match self {
            Listener::Tcp(transport) => transport.local_addr().to_string(),
            #[cfg(unix)]
            Listener::Unix(socket) => socket.path().display().to_string(),
        }
    }

    fn transport_name(&self) -> &'static str {
        match self {
            Listener::Tcp(transport) => transport.transport_name(),
            #[cfg(unix)]
            Listener::Unix(socket) => socket.transport_name(),
        }
    }

    fn accept(&self, config: ConnectionConfig) -> CliResult<Box<dyn MessageConnection>> {
        match self {
            Listener::Tcp(transport) => {
                let stream = transport
                    .accept()
                    .map_err(|err| transport_error("accept failed", err))?;
                Ok(Box::new(Connection::new(stream, config)))
            }
            #[cfg(unix)]
            Listener::Unix(socket) => {
                let stream = socket
                    .accept()
                    .map_err(|err| transport_error("accept failed", err))?;
                Ok(Box::new(Connection::new(stream, config)))
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ReadErrorDisposition {
    Ignore,
    EndSession,
}

pub fn run(args: EchoArgs, _format: OutputFormat) -> CliResult<i32> {
    let config = args.connection.config();
    let listener = Listener::bind(&args.addr)?;
    tracing::info!(
        transport = listener.transport_name(),
        addr = %listener.local(),
        framing = %config.framing,
        "echo server listening"
    );

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut served = 0usize;
    while running.load(Ordering::SeqCst) {
        let mut conn = listener.accept(config.clone())?;
        let echoed = serve(conn.as_mut(), &running);
        tracing::info!(descriptor = conn.descriptor(), echoed, "session ended");

        served += 1;
        if args.count.is_some_and(|limit| served >= limit) {
            break;
        }
    }

    Ok(SUCCESS)
}

/// Echo messages until the session ends. Returns how many were echoed.
fn serve(conn: &mut dyn MessageConnection, running: &AtomicBool) -> usize {
    let mut echoed = 0usize;

    while running.load(Ordering::SeqCst) {
        let mut msg = Raw::default();
        if let Err(err) = conn.read(&mut msg) {
            match classify_read_error(&err) {
                ReadErrorDisposition::Ignore => continue,
                ReadErrorDisposition::EndSession => break,
            }
        }

        tracing::debug!(size = msg.as_bytes().len(), "echoing message");
        if let Err(err) = conn.write(&msg) {
            tracing::warn!(error = %err, "echo write failed");
            break;
        }
        echoed += 1;
    }

    if let Err(err) = conn.close() {
        tracing::warn!(error = %err, "close failed");
    }
    echoed
}

fn classify_read_error(err: &ConnectionError) -> ReadErrorDisposition {
    if err.is_health_check() {
        tracing::debug!(error = %err, "ignoring health check");
        return ReadErrorDisposition::Ignore;
    }
    if err.is_marshal() {
        tracing::warn!(error = %err, "dropping undecodable message");
        return ReadErrorDisposition::Ignore;
    }
    if err.is_disconnect() {
        tracing::debug!(error = %err, "peer disconnected");
    } else {
        tracing::warn!(error = %err, "read failed");
    }
    ReadErrorDisposition::EndSession
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
