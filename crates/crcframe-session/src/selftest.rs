//! Built-in self-check stream.
//!
//! A peer that receives a `test` frame answers with one `data` frame per
//! check, `"<id>t"` on pass and `"<id>f"` on failure. Checks 1–9 pin the
//! CRC-8 reference vectors, 10–16 the encoded frame lengths, and 17–20 run
//! frames through a loopback codec.

use crcframe_codec::{
    crc8, encode_to_bytes, ErrorCode, Message, MessageKind, PacketCodec, ProtocolFault,
};
use crcframe_transport::MemoryTransport;

/// Number of checks in the stream.
pub const CHECK_COUNT: usize = 20;

/// Result of one numbered check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfCheck {
    pub id: u8,
    pub passed: bool,
}

impl SelfCheck {
    /// Wire text sent in the result frame.
    pub fn payload(&self) -> String {
        format!("{}{}", self.id, if self.passed { 't' } else { 'f' })
    }

    /// Parse a result frame payload.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let (&verdict, digits) = payload.split_last()?;
        let passed = match verdict {
            b't' => true,
            b'f' => false,
            _ => return None,
        };
        let id = std::str::from_utf8(digits).ok()?.trim().parse().ok()?;
        Some(Self { id, passed })
    }
}

type Check = fn() -> bool;

/// Run every check, in id order.
pub fn run_checks() -> Vec<SelfCheck> {
    let checks: [(u8, Check); CHECK_COUNT] = [
        (1, crc_short),
        (2, crc_empty),
        (3, crc_single),
        (4, crc_ascending),
        (5, crc_zeros),
        (6, crc_ones),
        (7, crc_word),
        (8, crc_digits),
        (9, crc_sentence),
        (10, len_open),
        (11, len_close),
        (12, len_ack),
        (13, len_small),
        (14, len_large),
        (15, len_text),
        (16, len_empty),
        (17, loopback_open),
        (18, loopback_close),
        (19, loopback_echo),
        (20, loopback_bad_crc),
    ];

    checks
        .iter()
        .map(|&(id, check)| SelfCheck {
            id,
            passed: check(),
        })
        .collect()
}

fn crc_short() -> bool {
    crc8(&[0x01, 0x02, 0x03, 0x04, 0x05]) == 188
}

fn crc_empty() -> bool {
    crc8(&[]) == 0x00
}

fn crc_single() -> bool {
    crc8(&[0x01]) == 0x07
}

fn crc_ascending() -> bool {
    let data: Vec<u8> = (0..=u8::MAX).collect();
    crc8(&data) == 20
}

fn crc_zeros() -> bool {
    crc8(&[0x00; 256]) == 0x00
}

fn crc_ones() -> bool {
    crc8(&[0xFF; 256]) == 36
}

fn crc_word() -> bool {
    crc8(b"hello") == 146
}

fn crc_digits() -> bool {
    crc8(b"00000") == 119
}

fn crc_sentence() -> bool {
    crc8(b"The quick brown fox jumps over the lazy dog.") == 131
}

fn frame_len(kind: MessageKind, payload: &[u8]) -> Option<usize> {
    encode_to_bytes(kind, payload).ok().map(|frame| frame.len())
}

fn len_open() -> bool {
    frame_len(MessageKind::Open, &[]) == Some(7)
}

fn len_close() -> bool {
    frame_len(MessageKind::Close, &[]) == Some(7)
}

fn len_ack() -> bool {
    frame_len(MessageKind::Ack, &[ErrorCode::NoError.as_byte()]) == Some(8)
}

fn len_small() -> bool {
    frame_len(MessageKind::Data, &[0x00, 0x01, 0x02]) == Some(10)
}

fn len_large() -> bool {
    frame_len(MessageKind::Data, &[96; 240]) == Some(247)
}

fn len_text() -> bool {
    frame_len(MessageKind::Data, b"hello") == Some(12)
}

fn len_empty() -> bool {
    frame_len(MessageKind::Data, &[]) == Some(7)
}

/// Decode `wire` on a loopback codec; returns the message, faults and
/// whatever the codec wrote back.
fn loopback(wire: &[u8]) -> Option<(Message, Vec<ProtocolFault>, Vec<u8>)> {
    let mut codec = PacketCodec::new(MemoryTransport::with_inbound(wire));
    let decoded = codec.decode().ok()?;
    Some((
        decoded.message,
        decoded.faults,
        codec.into_inner().take_outbound(),
    ))
}

fn loopback_open() -> bool {
    let Ok(open) = encode_to_bytes(MessageKind::Open, &[]) else {
        return false;
    };
    matches!(loopback(&open), Some((Message::Open, faults, reply)) if faults.is_empty() && reply == open)
}

fn loopback_close() -> bool {
    let Ok(close) = encode_to_bytes(MessageKind::Close, &[]) else {
        return false;
    };
    matches!(loopback(&close), Some((Message::Close, faults, reply)) if faults.is_empty() && reply == close)
}

fn loopback_echo() -> bool {
    let (Ok(echo), Ok(data)) = (
        encode_to_bytes(MessageKind::Echo, b"hello"),
        encode_to_bytes(MessageKind::Data, b"hello"),
    ) else {
        return false;
    };
    matches!(loopback(&echo), Some((Message::Echo, _, reply)) if reply == data)
}

fn loopback_bad_crc() -> bool {
    let (Ok(frame), Ok(nack)) = (
        encode_to_bytes(MessageKind::Data, b"hello"),
        encode_to_bytes(MessageKind::Ack, &[ErrorCode::Crc.as_byte()]),
    ) else {
        return false;
    };
    let mut corrupted = frame.to_vec();
    let crc_at = corrupted.len() - 2;
    corrupted[crc_at] ^= 0x5A;

    matches!(
        loopback(&corrupted),
        Some((Message::Data(_), faults, reply))
            if matches!(faults.as_slice(), [ProtocolFault::CrcMismatch { .. }]) && reply == nack
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_checks_pass() {
        let results = run_checks();
        assert_eq!(results.len(), CHECK_COUNT);
        for (index, check) in results.iter().enumerate() {
            assert_eq!(usize::from(check.id), index + 1);
            assert!(check.passed, "check {} failed", check.id);
        }
    }

    #[test]
    fn payload_text() {
        assert_eq!(SelfCheck { id: 1, passed: true }.payload(), "1t");
        assert_eq!(SelfCheck { id: 14, passed: false }.payload(), "14f");
    }

    #[test]
    fn parse_payload() {
        assert_eq!(
            SelfCheck::parse(b"17t"),
            Some(SelfCheck { id: 17, passed: true })
        );
        assert_eq!(
            SelfCheck::parse(b"3 f"),
            Some(SelfCheck { id: 3, passed: false })
        );
        assert_eq!(SelfCheck::parse(b"t"), None);
        assert_eq!(SelfCheck::parse(b"12x"), None);
        assert_eq!(SelfCheck::parse(b""), None);
    }
}
