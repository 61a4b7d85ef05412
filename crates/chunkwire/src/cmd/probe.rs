use chunkwire_connection::probe::CRAWLER_REQUEST_LINE;
use chunkwire_connection::{MessageConnection, Raw};
use chunkwire_frame::Operation;

use crate::cmd::{connect, ProbeArgs, Target};
use crate::exit::{connection_error, CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::{print_probe, OutputFormat, ProbeReport};

/// How the server reacted to the probe.
#[derive(Debug, PartialEq, Eq)]
enum Verdict {
    /// No reply within the settle time and the connection is still open.
    Ignored,
    /// The server answered, so it treated the probe as a message.
    Answered(usize),
    /// The server hung up.
    Dropped,
}

impl Verdict {
    fn as_str(&self) -> &'static str {
        match self {
            Verdict::Ignored => "ignored",
            Verdict::Answered(_) => "answered",
            Verdict::Dropped => "dropped",
        }
    }

    fn detail(&self) -> String {
        match self {
            Verdict::Ignored => "server stayed silent and kept the connection open".to_string(),
            Verdict::Answered(n) => format!("server replied with {n} bytes"),
            Verdict::Dropped => "server closed the connection".to_string(),
        }
    }
}

pub fn run(args: ProbeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.connection.config().with_read_timeout(args.settle);
    let mut conn = connect(&args.addr, config)?;

    conn.write(&Raw::new(probe_request(&args.addr)))
        .map_err(|err| connection_error("probe write failed", err))?;
    let verdict = await_verdict(conn.as_mut())?;

    let report = ProbeReport {
        target: args.addr.to_string(),
        descriptor: conn.descriptor().to_string(),
        verdict: verdict.as_str(),
        detail: verdict.detail(),
    };
    print_probe(&report, format);

    if let Err(err) = conn.close() {
        tracing::warn!(error = %err, "close failed");
    }

    Ok(match verdict {
        Verdict::Ignored => SUCCESS,
        Verdict::Answered(_) | Verdict::Dropped => HEALTH_CHECK_FAILED,
    })
}

fn probe_request(target: &Target) -> Vec<u8> {
    let mut request = CRAWLER_REQUEST_LINE.to_vec();
    request.extend_from_slice(
        format!("\r\nHost: {target}\r\nUser-Agent: chunkwire-probe\r\n\r\n").as_bytes(),
    );
    request
}

fn await_verdict(conn: &mut dyn MessageConnection) -> CliResult<Verdict> {
    let mut reply = Raw::default();
    match conn.read(&mut reply) {
        Ok(()) => Ok(Verdict::Answered(reply.as_bytes().len())),
        Err(err) if err.timeout() == Some((Operation::Read, 0)) => Ok(Verdict::Ignored),
        Err(err) if err.is_disconnect() => Ok(Verdict::Dropped),
        Err(err) => Err(connection_error("probe read failed", err)),
    }
}
