//! Encode path: one method per locally originated message kind.

use crcframe_transport::Transport;
use tracing::debug;

use crate::error::{CodecError, Result};
use crate::kind::{ErrorCode, MessageKind};
use crate::packet::PacketCodec;
use crate::wire::encode_frame;

impl<T: Transport> PacketCodec<T> {
    /// Encode and write a frame of any kind, returning the frame length.
    ///
    /// Nothing is written if the payload is too large.
    pub fn encode(&mut self, kind: MessageKind, payload: &[u8]) -> Result<usize> {
        if payload.len() > self.config.max_payload_size {
            return Err(CodecError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        let length = encode_frame(kind, payload, &mut self.buf)?;
        self.transport.write_all(&self.buf)?;

        debug!(kind = %kind, length, "sent frame");
        Ok(length)
    }

    /// Send application data.
    pub fn encode_data(&mut self, payload: &[u8]) -> Result<usize> {
        self.encode(MessageKind::Data, payload)
    }

    /// Send an outcome code.
    pub fn encode_ack(&mut self, code: ErrorCode) -> Result<usize> {
        self.encode(MessageKind::Ack, &[code.as_byte()])
    }

    /// Send a session-open frame.
    pub fn encode_open(&mut self) -> Result<usize> {
        self.encode(MessageKind::Open, &[])
    }

    /// Send a session-close frame.
    pub fn encode_close(&mut self) -> Result<usize> {
        self.encode(MessageKind::Close, &[])
    }

    /// Ask the peer to send `payload` back as data.
    pub fn encode_echo(&mut self, payload: &[u8]) -> Result<usize> {
        self.encode(MessageKind::Echo, payload)
    }

    /// Ask the peer for its self-check stream.
    pub fn encode_test(&mut self) -> Result<usize> {
        self.encode(MessageKind::Test, &[])
    }
}

#[cfg(test)]
mod tests {
    use std::io::{ErrorKind, Write};

    use crcframe_transport::{MemoryTransport, TransportError};

    use super::*;
    use crate::packet::CodecConfig;

    fn sent<F>(f: F) -> Vec<u8>
    where
        F: FnOnce(&mut PacketCodec<MemoryTransport>) -> Result<usize>,
    {
        let mut codec = PacketCodec::new(MemoryTransport::new());
        f(&mut codec).unwrap();
        codec.into_inner().take_outbound()
    }

    #[test]
    fn open_and_close() {
        assert_eq!(
            sent(|c| c.encode_open()),
            [0xAA, 0x00, 0x07, 0x02, 0x6F, 0xD7, 0xBB]
        );
        assert_eq!(
            sent(|c| c.encode_close()),
            [0xAA, 0x00, 0x07, 0x02, 0x63, 0x2D, 0xBB]
        );
    }

    #[test]
    fn ack_codes() {
        assert_eq!(
            sent(|c| c.encode_ack(ErrorCode::NoError)),
            [0xAA, 0x00, 0x08, 0x02, 0x61, 0x00, 0x8F, 0xBB]
        );
        assert_eq!(
            sent(|c| c.encode_ack(ErrorCode::Type)),
            [0xAA, 0x00, 0x08, 0x02, 0x61, 0x04, 0x24, 0xBB]
        );
    }

    #[test]
    fn echo_and_test() {
        assert_eq!(
            sent(|c| c.encode_echo(b"hello")),
            [0xAA, 0x00, 0x0C, 0x02, 0x65, b'h', b'e', b'l', b'l', b'o', 0x95, 0xBB]
        );
        assert_eq!(
            sent(|c| c.encode_test()),
            [0xAA, 0x00, 0x07, 0x02, 0x74, 0x99, 0xBB]
        );
    }

    #[test]
    fn returns_frame_length() {
        let mut codec = PacketCodec::new(MemoryTransport::new());
        assert_eq!(codec.encode_data(&[0, 1, 2]).unwrap(), 10);
        assert_eq!(codec.encode_data(&[96; 240]).unwrap(), 247);
        assert_eq!(codec.encode_data(b"hello").unwrap(), 12);
        assert_eq!(codec.encode_data(&[]).unwrap(), 7);
        assert_eq!(codec.encode_ack(ErrorCode::NoError).unwrap(), 8);
        assert_eq!(codec.get_ref().outbound().len(), 10 + 247 + 12 + 7 + 8);
    }

    #[test]
    fn consecutive_frames_do_not_bleed() {
        let mut codec = PacketCodec::new(MemoryTransport::new());
        codec.encode_data(b"first frame payload").unwrap();
        codec.get_mut().take_outbound();
        codec.encode_open().unwrap();
        assert_eq!(
            codec.get_ref().outbound(),
            &[0xAA, 0x00, 0x07, 0x02, 0x6F, 0xD7, 0xBB]
        );
    }

    #[test]
    fn configured_limit_rejects_before_writing() {
        let cfg = CodecConfig {
            max_payload_size: 4,
            ..CodecConfig::default()
        };
        let mut codec = PacketCodec::with_config(MemoryTransport::new(), cfg);
        let err = codec.encode_data(b"oversized").unwrap_err();
        assert!(matches!(err, CodecError::PayloadTooLarge { size: 9, max: 4 }));
        assert!(codec.get_ref().outbound().is_empty());
    }

    #[test]
    fn transport_failure_propagates() {
        let mut codec = PacketCodec::new(BrokenLink);
        let err = codec.encode_open().unwrap_err();
        assert!(matches!(
            err,
            CodecError::Transport(TransportError::Disconnected)
        ));
    }

    struct BrokenLink;

    impl std::io::Read for BrokenLink {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for BrokenLink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
