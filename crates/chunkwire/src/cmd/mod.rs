use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chunkwire_connection::{Connection, ConnectionConfig, MessageConnection};
use chunkwire_frame::Framing;
use chunkwire_transport::TcpTransport;
#[cfg(unix)]
use chunkwire_transport::UnixDomainSocket;
use clap::{ArgGroup, Args, Subcommand};

use crate::exit::{transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod echo;
pub mod probe;
pub mod send;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an echo server.
    Echo(EchoArgs),
    /// Send one message, optionally waiting for the reply.
    Send(SendArgs),
    /// Check whether a server ignores crawler health-check traffic.
    Probe(ProbeArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Echo(args) => echo::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Probe(args) => probe::run(args, format),
    }
}

/// Connection settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Message framing: chunked or prefixed.
    #[arg(long, env = "CHUNKWIRE_FRAMING", default_value = "chunked")]
    pub framing: Framing,
    /// Deadline for each read (e.g. 5s, 500ms).
    #[arg(long, env = "CHUNKWIRE_READ_TIMEOUT", default_value = "30s", value_parser = parse_duration)]
    pub read_timeout: Duration,
    /// Deadline for each write (e.g. 5s, 500ms).
    #[arg(long, env = "CHUNKWIRE_WRITE_TIMEOUT", default_value = "30s", value_parser = parse_duration)]
    pub write_timeout: Duration,
}

impl ConnectionArgs {
    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig::default()
            .with_framing(self.framing)
            .with_read_timeout(self.read_timeout)
            .with_write_timeout(self.write_timeout)
    }
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Address to listen on: host:port, or a socket path (unix:PATH).
    pub addr: Target,
    /// Exit after serving N connections.
    #[arg(long)]
    pub count: Option<usize>,
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("payload").required(true).args(["data", "file"])))]
pub struct SendArgs {
    /// Address to connect to: host:port, or a socket path (unix:PATH).
    pub addr: Target,
    /// Raw string payload.
    #[arg(long)]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Wait for one reply and print it.
    #[arg(long)]
    pub wait: bool,
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Address to connect to: host:port, or a socket path (unix:PATH).
    pub addr: Target,
    /// How long the server may stay silent before the probe counts as ignored.
    #[arg(long, default_value = "500ms", value_parser = parse_duration)]
    pub settle: Duration,
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Where to listen or connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Tcp(String),
    Unix(PathBuf),
}

impl FromStr for Target {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.is_empty() {
            return Err("address must not be empty".to_string());
        }
        if let Some(path) = input.strip_prefix("unix:") {
            return Ok(Target::Unix(PathBuf::from(path)));
        }
        if input.starts_with('/') || input.starts_with('.') {
            return Ok(Target::Unix(PathBuf::from(input)));
        }
        if input.contains(':') {
            return Ok(Target::Tcp(input.to_string()));
        }
        Err(format!("expected host:port or a socket path, got {input}"))
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Tcp(addr) => write!(f, "{addr}"),
            Target::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

/// Dial `target` and wrap the stream in a connection.
pub fn connect(target: &Target, config: ConnectionConfig) -> CliResult<Box<dyn MessageConnection>> {
    match target {
        Target::Tcp(addr) => {
            let stream = TcpTransport::connect_timeout(addr, config.write_timeout)
                .map_err(|err| transport_error("connect failed", err))?;
            Ok(Box::new(Connection::new(stream, config)))
        }
        #[cfg(unix)]
        Target::Unix(path) => {
            let stream = UnixDomainSocket::connect(path)
                .map_err(|err| transport_error("connect failed", err))?;
            Ok(Box::new(Connection::new(stream, config)))
        }
        #[cfg(not(unix))]
        Target::Unix(_) => Err(CliError::new(
            USAGE,
            "unix sockets are not supported on this platform",
        )),
    }
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
