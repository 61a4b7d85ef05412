mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "chunkwire", version, about = "Framed message exchange over sockets")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);

    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chunkwire_frame::Framing;

    use super::*;
    use crate::cmd::Target;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "chunkwire",
            "send",
            "127.0.0.1:7000",
            "--data",
            "hello",
            "--framing",
            "prefixed",
            "--read-timeout",
            "250ms",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.addr, Target::Tcp("127.0.0.1:7000".to_string()));
        assert_eq!(args.connection.framing, Framing::LengthPrefixed);
        assert_eq!(args.connection.read_timeout, Duration::from_millis(250));
        assert_eq!(args.connection.write_timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "chunkwire",
            "send",
            "127.0.0.1:7000",
            "--file",
            "/tmp/payload",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn send_requires_a_payload() {
        let err = Cli::try_parse_from(["chunkwire", "send", "127.0.0.1:7000"])
            .expect_err("missing payload should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = Cli::try_parse_from([
            "chunkwire",
            "probe",
            "127.0.0.1:7000",
            "--write-timeout",
            "0s",
        ])
        .expect_err("zero timeout should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_echo_on_unix_path() {
        let cli = Cli::try_parse_from(["chunkwire", "echo", "unix:/tmp/echo.sock", "--count", "1"])
            .expect("echo args should parse");

        let Command::Echo(args) = cli.command else {
            panic!("expected echo");
        };
        assert_eq!(args.addr, Target::Unix("/tmp/echo.sock".into()));
        assert_eq!(args.count, Some(1));
    }
}
