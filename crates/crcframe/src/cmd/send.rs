use std::fs;

use crcframe_codec::{AckOutcome, Decoded, ErrorCode, Message, MessageKind};
use crcframe_session::{Session, SessionConfig};
use crcframe_transport::Transport;
use tracing::info;

use crate::cmd::{open_link, parse_duration, FrameKind, SendArgs};
use crate::exit::{
    session_error, transport_error, CliError, CliResult, PROTOCOL_FAULT, SUCCESS, USAGE,
};
use crate::output::{print_decoded, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let payload = resolve_payload(&args)?;

    let stream = open_link(&args.link)?;
    stream
        .set_read_timeout(Some(timeout))
        .map_err(|err| transport_error("configure failed", err))?;

    let mut session =
        Session::with_config(stream, SessionConfig::default().with_answer_test(false));
    let written = send_frame(&mut session, args.kind, &payload)
        .map_err(|err| session_error("send failed", err))?;
    info!(kind = args.kind.as_str(), bytes = written, "frame sent");

    let mut faulted = false;
    for _ in 0..args.wait {
        let decoded = session
            .recv()
            .map_err(|err| session_error("receive failed", err))?;
        print_decoded(&decoded, format);
        faulted |= is_fault_reply(&decoded);
    }

    Ok(if faulted { PROTOCOL_FAULT } else { SUCCESS })
}

fn send_frame<T: Transport>(
    session: &mut Session<T>,
    kind: FrameKind,
    payload: &[u8],
) -> crcframe_session::Result<usize> {
    match kind {
        FrameKind::Data => session.send(payload),
        FrameKind::Echo => session.echo(payload),
        FrameKind::Test => session.request_test(),
        // Raw so that out-of-range codes can be sent too.
        FrameKind::Ack => Ok(session.codec_mut().encode(MessageKind::Ack, payload)?),
        FrameKind::Open => {
            session.connect()?;
            Ok(crcframe_codec::FRAME_OVERHEAD)
        }
        FrameKind::Close => {
            session.disconnect()?;
            Ok(crcframe_codec::FRAME_OVERHEAD)
        }
    }
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    match args.kind {
        FrameKind::Ack => {
            if args.data.is_some() || args.file.is_some() {
                return Err(CliError::new(USAGE, "--kind ack takes --code, not a payload"));
            }
            let code = args.code.unwrap_or(ErrorCode::NoError.as_byte());
            Ok(vec![code])
        }
        FrameKind::Open | FrameKind::Close | FrameKind::Test => {
            if args.data.is_some() || args.file.is_some() || args.code.is_some() {
                return Err(CliError::new(
                    USAGE,
                    format!("--kind {} carries no payload", args.kind.as_str()),
                ));
            }
            Ok(Vec::new())
        }
        FrameKind::Data | FrameKind::Echo => {
            if args.code.is_some() {
                return Err(CliError::new(USAGE, "--code is only valid with --kind ack"));
            }
            if let Some(data) = &args.data {
                return Ok(data.as_bytes().to_vec());
            }
            if let Some(path) = &args.file {
                return fs::read(path).map_err(|err| {
                    crate::exit::io_error(&format!("failed reading {}", path.display()), err)
                });
            }
            Ok(Vec::new())
        }
    }
}

/// A reply that reports a problem: decode faults or a failure ack.
fn is_fault_reply(decoded: &Decoded) -> bool {
    if !decoded.is_clean() {
        return true;
    }
    match &decoded.message {
        Message::Ack(AckOutcome::Known(code)) => matches!(
            code,
            ErrorCode::Crc | ErrorCode::Version | ErrorCode::Ending | ErrorCode::Type
        ),
        Message::Ack(AckOutcome::Unknown(_) | AckOutcome::Missing) => true,
        Message::UnknownType(_) => true,
        _ => false,
    }
}
