//! Decoded message values.

use std::fmt;

use bytes::Bytes;

use crate::kind::{ErrorCode, MessageKind};

/// What an `ack` frame reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// A recognized error code.
    Known(ErrorCode),
    /// A code byte outside the known set.
    Unknown(u8),
    /// The ack frame carried no payload.
    Missing,
}

impl AckOutcome {
    /// Interpret an ack payload. Only the first byte is significant.
    pub fn from_payload(payload: &[u8]) -> Self {
        match payload.first() {
            Some(&byte) => match ErrorCode::from_byte(byte) {
                Some(code) => AckOutcome::Known(code),
                None => AckOutcome::Unknown(byte),
            },
            None => AckOutcome::Missing,
        }
    }

    /// True for `ack(NO_ERROR)`.
    pub fn is_success(&self) -> bool {
        matches!(self, AckOutcome::Known(ErrorCode::NoError))
    }

    /// The reported code, if recognized.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            AckOutcome::Known(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for AckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AckOutcome::Known(code) => f.write_str(code.description()),
            AckOutcome::Unknown(byte) => write!(f, "unknown ack: 0x{byte:02X}"),
            AckOutcome::Missing => f.write_str("unknown ack: <empty>"),
        }
    }
}

/// The typed result of decoding one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Peer reported an outcome.
    Ack(AckOutcome),
    /// Application payload, verbatim.
    Data(Bytes),
    /// Peer opened the session; an `open` frame has been sent back.
    Open,
    /// Peer closed the session; a `close` frame has been sent back.
    Close,
    /// Peer asked for an echo; the payload has been sent back as `data`.
    Echo,
    /// Peer requested the self-check stream.
    Test,
    /// Unrecognized tag; `ack(TYPE)` has been sent back.
    UnknownType(u8),
}

impl Message {
    /// The kind of frame this message came from.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Ack(_) => MessageKind::Ack,
            Message::Data(_) => MessageKind::Data,
            Message::Open => MessageKind::Open,
            Message::Close => MessageKind::Close,
            Message::Echo => MessageKind::Echo,
            Message::Test => MessageKind::Test,
            Message::UnknownType(tag) => MessageKind::Unknown(*tag),
        }
    }

    /// Data payload, if this is a `data` message.
    pub fn data(&self) -> Option<&Bytes> {
        match self {
            Message::Data(payload) => Some(payload),
            _ => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Ack(outcome) => fmt::Display::fmt(outcome, f),
            Message::Data(payload) => f.write_str(&String::from_utf8_lossy(payload)),
            Message::Open => f.write_str("open"),
            Message::Close => f.write_str("close"),
            Message::Echo => f.write_str("echo"),
            Message::Test => f.write_str("test"),
            Message::UnknownType(tag) => write!(f, "unknown type: 0x{tag:02X}"),
        }
    }
}

/// A recoverable fault detected while decoding a frame.
///
/// Each one has already been reported to the peer with an `ack` carrying
/// [`ProtocolFault::error_code`]; decoding of the frame went on regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolFault {
    #[error("incorrect protocol version 0x{received:02X}")]
    VersionMismatch { received: u8 },

    #[error("incorrect crc: got 0x{received:02X}, expected 0x{expected:02X}")]
    CrcMismatch { received: u8, expected: u8 },

    #[error("missing end marker, got 0x{received:02X}")]
    BadEndMarker { received: u8 },

    #[error("unknown message type 0x{tag:02X}")]
    UnknownType { tag: u8 },
}

impl ProtocolFault {
    /// The code sent to the peer for this fault.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ProtocolFault::VersionMismatch { .. } => ErrorCode::Version,
            ProtocolFault::CrcMismatch { .. } => ErrorCode::Crc,
            ProtocolFault::BadEndMarker { .. } => ErrorCode::Ending,
            ProtocolFault::UnknownType { .. } => ErrorCode::Type,
        }
    }
}

/// One decoded frame together with everything that went wrong on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The dispatched message.
    pub message: Message,
    /// Faults detected (and acked) while reading the frame, in wire order.
    pub faults: Vec<ProtocolFault>,
    /// Bytes discarded before the start marker was found.
    pub discarded: usize,
}

impl Decoded {
    /// No protocol faults were detected.
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    /// Whether a fault with the given ack code was detected.
    pub fn has_fault(&self, code: ErrorCode) -> bool {
        self.faults.iter().any(|fault| fault.error_code() == code)
    }
}
