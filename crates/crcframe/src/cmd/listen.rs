use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crcframe_codec::{CodecConfig, CodecError};
use crcframe_session::{Session, SessionConfig, SessionError};
use crcframe_transport::{LinkStream, Transport, TransportError};
use tracing::{debug, info, warn};

use crate::cmd::ListenArgs;
use crate::exit::{session_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_decoded, OutputFormat};

/// Why a link stopped being served.
#[derive(Debug, PartialEq, Eq)]
enum Served {
    PeerGone,
    CountReached,
    Interrupted,
}

struct Responder {
    config: SessionConfig,
    count: Option<usize>,
    printed: usize,
    format: OutputFormat,
    running: Arc<AtomicBool>,
}

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let codec = CodecConfig {
        max_resync: args.max_resync,
        ..CodecConfig::default()
    };
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut responder = Responder {
        config: SessionConfig::default()
            .with_codec(codec)
            .with_answer_test(!args.no_self_test),
        count: args.count,
        printed: 0,
        format,
        running,
    };

    if args.link.device {
        let stream = LinkStream::open_device(&args.link.path)
            .map_err(|err| transport_error("open failed", err))?;
        info!(path = %args.link.path.display(), "serving device");
        responder.serve(stream)?;
        return Ok(SUCCESS);
    }

    listen_socket(&args, &mut responder)
}

#[cfg(unix)]
fn listen_socket(args: &ListenArgs, responder: &mut Responder) -> CliResult<i32> {
    let listener = crcframe_transport::UnixDomainSocket::bind(&args.link.path)
        .map_err(|err| transport_error("bind failed", err))?;
    info!(path = %listener.path().display(), "listening");

    while responder.running.load(Ordering::SeqCst) {
        let stream = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        match responder.serve(stream)? {
            Served::PeerGone => continue,
            Served::CountReached | Served::Interrupted => break,
        }
    }

    Ok(SUCCESS)
}

#[cfg(not(unix))]
fn listen_socket(args: &ListenArgs, _responder: &mut Responder) -> CliResult<i32> {
    Err(CliError::new(
        crate::exit::USAGE,
        format!(
            "{}: Unix sockets are not available on this platform, use --device",
            args.link.path.display()
        ),
    ))
}

impl Responder {
    fn serve<T: Transport>(&mut self, link: T) -> CliResult<Served> {
        let mut session = Session::with_config(link, self.config.clone());

        while self.running.load(Ordering::SeqCst) {
            let decoded = match session.recv() {
                Ok(decoded) => decoded,
                Err(SessionError::Codec(CodecError::Transport(TransportError::Disconnected))) => {
                    debug!(state = %session.state(), "peer disconnected");
                    return Ok(Served::PeerGone);
                }
                Err(SessionError::Codec(err @ CodecError::MalformedLength { .. })) => {
                    warn!(%err, "dropping frame");
                    continue;
                }
                Err(SessionError::Codec(err @ CodecError::ResyncExhausted { .. })) => {
                    warn!(%err, "dropping link");
                    return Ok(Served::PeerGone);
                }
                Err(err) => return Err(session_error("receive failed", err)),
            };

            print_decoded(&decoded, self.format);
            self.printed = self.printed.saturating_add(1);

            if self.count.is_some_and(|count| self.printed >= count) {
                return Ok(Served::CountReached);
            }
        }

        Ok(Served::Interrupted)
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        // A blocked read only notices the flag after the next frame.
        if running.swap(false, Ordering::SeqCst) {
            info!("interrupt received, stopping after the current frame");
        } else {
            std::process::exit(130);
        }
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
