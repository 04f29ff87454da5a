//! Decode path: the receive state machine.
//!
//! ```text
//! SEEK_START → READ_LENGTH → READ_VERSION → READ_TYPE
//!            → READ_PAYLOAD → READ_CRC → READ_END → DISPATCH
//! ```
//!
//! Structural faults are acked to the peer as soon as they are seen and the
//! frame is still decoded to the end. Only a length shorter than the frame
//! overhead, an oversized payload, an exhausted resync budget or a link
//! failure abort the call.

use bytes::Bytes;
use crcframe_transport::Transport;
use tracing::{debug, trace, warn};

use crate::error::{CodecError, Result};
use crate::kind::MessageKind;
use crate::message::{AckOutcome, Decoded, Message, ProtocolFault};
use crate::packet::PacketCodec;
use crate::wire::{frame_checksum, END_MARKER, FRAME_OVERHEAD, PROTOCOL_VERSION, START_MARKER};

impl<T: Transport> PacketCodec<T> {
    /// Read and dispatch the next frame (blocking).
    pub fn decode(&mut self) -> Result<Decoded> {
        let discarded = self.seek_start()?;
        let mut faults = Vec::new();

        let mut length_bytes = [0u8; 2];
        self.transport.read_exact(&mut length_bytes)?;
        let length = u16::from_be_bytes(length_bytes);

        let version = self.transport.read_u8()?;
        if version != PROTOCOL_VERSION {
            self.fault(
                &mut faults,
                ProtocolFault::VersionMismatch { received: version },
            )?;
        }

        let tag = self.transport.read_u8()?;

        let payload_len = usize::from(length)
            .checked_sub(FRAME_OVERHEAD)
            .ok_or(CodecError::MalformedLength { declared: length })?;
        if payload_len > self.config.max_payload_size {
            return Err(CodecError::PayloadTooLarge {
                size: payload_len,
                max: self.config.max_payload_size,
            });
        }
        let payload = self.transport.read(payload_len)?;

        let received_crc = self.transport.read_u8()?;
        let expected_crc = frame_checksum(length, version, tag, &payload);
        if received_crc != expected_crc {
            self.fault(
                &mut faults,
                ProtocolFault::CrcMismatch {
                    received: received_crc,
                    expected: expected_crc,
                },
            )?;
        }

        let end = self.transport.read_u8()?;
        if end != END_MARKER {
            self.fault(&mut faults, ProtocolFault::BadEndMarker { received: end })?;
        }

        let kind = MessageKind::from_tag(tag);
        debug!(kind = %kind, length, discarded, faults = faults.len(), "received frame");

        let message = self.dispatch(kind, payload, &mut faults)?;
        Ok(Decoded {
            message,
            faults,
            discarded,
        })
    }

    /// Discard bytes until a start marker; returns how many were discarded.
    fn seek_start(&mut self) -> Result<usize> {
        let mut discarded = 0usize;
        loop {
            let byte = self.transport.read_u8()?;
            if byte == START_MARKER {
                if discarded > 0 {
                    debug!(discarded, "resynchronized on start marker");
                }
                return Ok(discarded);
            }

            trace!(byte, "discarding byte before start marker");
            discarded += 1;
            if let Some(limit) = self.config.max_resync {
                if discarded > limit {
                    warn!(discarded, limit, "resync budget exhausted");
                    return Err(CodecError::ResyncExhausted { discarded });
                }
            }
        }
    }

    fn dispatch(
        &mut self,
        kind: MessageKind,
        payload: Bytes,
        faults: &mut Vec<ProtocolFault>,
    ) -> Result<Message> {
        let message = match kind {
            MessageKind::Ack => Message::Ack(AckOutcome::from_payload(&payload)),
            MessageKind::Data => Message::Data(payload),
            MessageKind::Open => {
                self.encode_open()?;
                Message::Open
            }
            MessageKind::Close => {
                self.encode_close()?;
                Message::Close
            }
            MessageKind::Echo => {
                self.encode_data(&payload)?;
                Message::Echo
            }
            MessageKind::Test => Message::Test,
            MessageKind::Unknown(tag) => {
                self.fault(faults, ProtocolFault::UnknownType { tag })?;
                Message::UnknownType(tag)
            }
        };
        Ok(message)
    }

    /// Ack a fault to the peer and record it.
    fn fault(&mut self, faults: &mut Vec<ProtocolFault>, fault: ProtocolFault) -> Result<()> {
        warn!(%fault, "protocol fault");
        self.encode_ack(fault.error_code())?;
        faults.push(fault);
        Ok(())
    }
}
