use std::fs;

use chunkwire_connection::{MessageConnection, Prefixed, Raw, Result as ConnResult};
use chunkwire_frame::Framing;

use crate::cmd::{connect, SendArgs};
use crate::exit::{connection_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let config = args.connection.config();
    let framing = config.framing;

    let mut conn = connect(&args.addr, config)?;
    tracing::debug!(descriptor = conn.descriptor(), size = payload.len(), "sending");

    send_payload(conn.as_mut(), framing, payload)
        .map_err(|err| connection_error("send failed", err))?;

    if args.wait {
        let reply = receive_reply(conn.as_mut(), framing)
            .map_err(|err| connection_error("receive failed", err))?;
        print_reply(&reply, conn.descriptor(), format);
    }

    conn.close()
        .map_err(|err| connection_error("close failed", err))?;
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "one of --data or --file is required"))
}

/// Prefixed framing expects the sender to carry the length prefix.
fn send_payload(
    conn: &mut dyn MessageConnection,
    framing: Framing,
    payload: Vec<u8>,
) -> ConnResult<()> {
    let msg = Raw::new(payload);
    match framing {
        Framing::Chunked => conn.write(&msg),
        Framing::LengthPrefixed => conn.write(&Prefixed(msg)),
    }
}

fn receive_reply(conn: &mut dyn MessageConnection, framing: Framing) -> ConnResult<Vec<u8>> {
    match framing {
        Framing::Chunked => {
            let mut reply = Raw::default();
            conn.read(&mut reply)?;
            Ok(reply.as_bytes().to_vec())
        }
        Framing::LengthPrefixed => {
            let mut reply = Prefixed(Raw::default());
            conn.read(&mut reply)?;
            Ok(reply.into_inner().as_bytes().to_vec())
        }
    }
}
