//! Message kinds and ack error codes.

use std::fmt;

/// Tag byte of a `data` frame.
pub const TAG_DATA: u8 = b'd';
/// Tag byte of an `ack` frame.
pub const TAG_ACK: u8 = b'a';
/// Tag byte of an `open` frame.
pub const TAG_OPEN: u8 = b'o';
/// Tag byte of a `close` frame.
pub const TAG_CLOSE: u8 = b'c';
/// Tag byte of an `echo` frame.
pub const TAG_ECHO: u8 = b'e';
/// Tag byte of a `test` frame.
pub const TAG_TEST: u8 = b't';

/// The message type carried in a frame's type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Opaque application payload.
    Data,
    /// One-byte [`ErrorCode`] reporting an outcome.
    Ack,
    /// Session open request/acknowledgement.
    Open,
    /// Session close request/acknowledgement.
    Close,
    /// Payload the receiver sends back as a `data` frame.
    Echo,
    /// Asks the peer for its self-check stream.
    Test,
    /// Any other tag byte.
    Unknown(u8),
}

impl MessageKind {
    /// Classify a tag byte. Never fails: unrecognized tags become `Unknown`.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            TAG_DATA => MessageKind::Data,
            TAG_ACK => MessageKind::Ack,
            TAG_OPEN => MessageKind::Open,
            TAG_CLOSE => MessageKind::Close,
            TAG_ECHO => MessageKind::Echo,
            TAG_TEST => MessageKind::Test,
            other => MessageKind::Unknown(other),
        }
    }

    /// The tag byte written on the wire.
    pub fn tag(self) -> u8 {
        match self {
            MessageKind::Data => TAG_DATA,
            MessageKind::Ack => TAG_ACK,
            MessageKind::Open => TAG_OPEN,
            MessageKind::Close => TAG_CLOSE,
            MessageKind::Echo => TAG_ECHO,
            MessageKind::Test => TAG_TEST,
            MessageKind::Unknown(tag) => tag,
        }
    }

    /// Lowercase name, `"unknown"` for unrecognized tags.
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::Data => "data",
            MessageKind::Ack => "ack",
            MessageKind::Open => "open",
            MessageKind::Close => "close",
            MessageKind::Echo => "echo",
            MessageKind::Test => "test",
            MessageKind::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Unknown(tag) => write!(f, "unknown(0x{tag:02X})"),
            known => f.write_str(known.name()),
        }
    }
}

/// Outcome codes carried in `ack` payloads.
///
/// Sent locally in response to a detected fault, and decoded when the peer
/// reports one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    NoError = 0,
    Crc = 1,
    Version = 2,
    Ending = 3,
    Type = 4,
    Opened = 5,
    Closed = 6,
}

impl ErrorCode {
    /// All codes in wire order.
    pub const ALL: [ErrorCode; 7] = [
        ErrorCode::NoError,
        ErrorCode::Crc,
        ErrorCode::Version,
        ErrorCode::Ending,
        ErrorCode::Type,
        ErrorCode::Opened,
        ErrorCode::Closed,
    ];

    /// Decode a wire byte; `None` outside the known set.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(usize::from(byte)).copied()
    }

    /// The wire byte.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Human-readable outcome.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::NoError => "success",
            ErrorCode::Crc => "CRC incorrect",
            ErrorCode::Version => "version incorrect",
            ErrorCode::Ending => "ending byte missing",
            ErrorCode::Type => "type unknown",
            ErrorCode::Opened => "connection opened",
            ErrorCode::Closed => "connection closed",
        }
    }

    /// Symbolic name, e.g. `"NO_ERROR"`.
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::NoError => "NO_ERROR",
            ErrorCode::Crc => "CRC",
            ErrorCode::Version => "VERSION",
            ErrorCode::Ending => "ENDING",
            ErrorCode::Type => "TYPE",
            ErrorCode::Opened => "OPENED",
            ErrorCode::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
