use bytes::BytesMut;

use crate::wire::MAX_PAYLOAD;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Configuration for a [`PacketCodec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Largest payload accepted in either direction. Default: [`MAX_PAYLOAD`].
    pub max_payload_size: usize,
    /// Give up seeking a start marker after this many discarded bytes.
    /// Default: `None` (keep discarding until the link delivers one).
    pub max_resync: Option<usize>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD,
            max_resync: None,
        }
    }
}

/// Packet codec bound to one transport.
///
/// Owns the link for its lifetime. Encoding writes one complete frame per
/// call; [`decode`](PacketCodec::decode) reads one frame and may itself write
/// (acks for faults, `open`/`close`/`echo` responses) before returning. No
/// frame state survives between calls.
pub struct PacketCodec<T> {
    pub(crate) transport: T,
    pub(crate) buf: BytesMut,
    pub(crate) config: CodecConfig,
}

impl<T> PacketCodec<T> {
    /// Create a codec with default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, CodecConfig::default())
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(transport: T, config: CodecConfig) -> Self {
        Self {
            transport,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the codec and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Current configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Bound (or unbound, with `None`) the resync discard budget.
    pub fn set_max_resync(&mut self, max_resync: Option<usize>) {
        self.config.max_resync = max_resync;
    }
}

impl<T> std::fmt::Debug for PacketCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketCodec")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
