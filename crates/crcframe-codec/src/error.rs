use crcframe_transport::TransportError;

/// Errors that abort encoding or decoding of a frame.
///
/// Recoverable protocol faults (bad version, crc, end marker, type) are not
/// errors; they are acked to the peer and reported in
/// [`Decoded::faults`](crate::message::Decoded).
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The link failed; fatal to the current call.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The length field is smaller than the fixed frame overhead.
    #[error("malformed frame length {declared} (minimum 7)")]
    MalformedLength { declared: u16 },

    /// The payload exceeds what the frame or configuration allows.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// No start marker within the configured resync budget.
    #[error("no start marker after discarding {discarded} bytes")]
    ResyncExhausted { discarded: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
