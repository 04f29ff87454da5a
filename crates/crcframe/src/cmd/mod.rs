use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crcframe_session::CHECK_COUNT;
use crcframe_transport::LinkStream;

use crate::exit::{transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Act as the responder endpoint and print received messages.
    Listen(ListenArgs),
    /// Send a single frame, optionally printing replies.
    Send(SendArgs),
    /// Ask the peer for its self-check stream.
    Test(TestArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Test(args) => test::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Unix socket path, or a serial device path with --device.
    #[arg(env = "CRCFRAME_DEVICE")]
    pub path: PathBuf,
    /// Treat PATH as a character device instead of a Unix socket.
    #[arg(long)]
    pub device: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Do not answer `test` requests.
    #[arg(long)]
    pub no_self_test: bool,
    /// Fail when more than N bytes precede a start marker.
    #[arg(long, value_name = "N")]
    pub max_resync: Option<usize>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FrameKind {
    Data,
    Echo,
    Open,
    Close,
    Test,
    Ack,
}

impl FrameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameKind::Data => "data",
            FrameKind::Echo => "echo",
            FrameKind::Open => "open",
            FrameKind::Close => "close",
            FrameKind::Test => "test",
            FrameKind::Ack => "ack",
        }
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Frame type to send.
    #[arg(long, short = 'k', value_enum, default_value = "data")]
    pub kind: FrameKind,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["file", "code"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "code"])]
    pub file: Option<PathBuf>,
    /// Ack code byte (with --kind ack).
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub code: Option<u8>,
    /// Print the next N received messages.
    #[arg(long, value_name = "N", default_value = "0")]
    pub wait: usize,
    /// Read timeout while waiting for replies (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct TestArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Number of result frames to collect.
    #[arg(long, default_value_t = CHECK_COUNT)]
    pub count: usize,
    /// Read timeout per result frame (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open the client side of a link.
pub(crate) fn open_link(link: &LinkArgs) -> CliResult<LinkStream> {
    if link.device {
        return LinkStream::open_device(&link.path)
            .map_err(|err| transport_error("open failed", err));
    }
    connect_socket(link)
}

#[cfg(unix)]
fn connect_socket(link: &LinkArgs) -> CliResult<LinkStream> {
    crcframe_transport::UnixDomainSocket::connect(&link.path)
        .map_err(|err| transport_error("connect failed", err))
}

#[cfg(not(unix))]
fn connect_socket(link: &LinkArgs) -> CliResult<LinkStream> {
    Err(CliError::new(
        USAGE,
        format!(
            "{}: Unix sockets are not available on this platform, use --device",
            link.path.display()
        ),
    ))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
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
