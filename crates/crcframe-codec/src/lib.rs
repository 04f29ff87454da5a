//! CRC-8 checked packet framing over a blocking byte stream.
//!
//! Every message is framed with:
//! - a `0xAA` start marker for resynchronization
//! - a 2-byte big-endian length covering the whole frame
//! - a version byte (`0x02`) and an ASCII message-type byte
//! - a CRC-8 (polynomial `0x07`) and a `0xBB` end marker
//!
//! Decoding is tolerant: a bad version, crc, end marker or type is acked to
//! the peer and reported alongside the message instead of dropping the frame.

pub mod crc;
pub mod error;
pub mod kind;
pub mod message;
pub mod packet;
mod reader;
pub mod wire;
mod writer;

pub use self::crc::{crc8, Crc8};
pub use error::{CodecError, Result};
pub use kind::{ErrorCode, MessageKind};
pub use message::{AckOutcome, Decoded, Message, ProtocolFault};
pub use packet::{CodecConfig, PacketCodec};
pub use wire::{
    encode_frame, encode_to_bytes, frame_checksum, END_MARKER, FRAME_OVERHEAD, MAX_PAYLOAD,
    PROTOCOL_VERSION, START_MARKER,
};
