//! CRC-8 framed packet protocol for serial links and local sockets.
//!
//! Frames are `0xAA | length | version | tag | payload | crc8 | 0xBB`; the
//! decoder resynchronizes on the start marker and acks structural faults
//! back to the peer without dropping the frame.
//!
//! # Crate Structure
//!
//! - [`transport`]: blocking byte-stream links (serial device, Unix socket, memory)
//! - [`codec`]: frame encoding, the receive state machine and CRC-8
//! - [`session`]: open/closed state and the self-check responder (behind `session` feature)

/// Re-export transport types.
pub mod transport {
    pub use crcframe_transport::*;
}

/// Re-export codec types.
pub mod codec {
    pub use crcframe_codec::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use crcframe_session::*;
}
