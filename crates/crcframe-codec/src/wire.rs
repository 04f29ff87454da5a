use bytes::{BufMut, Bytes, BytesMut};

use crate::crc::{crc8, Crc8};
use crate::error::{CodecError, Result};
use crate::kind::MessageKind;

/// First byte of every frame.
pub const START_MARKER: u8 = 0xAA;

/// Last byte of every frame.
pub const END_MARKER: u8 = 0xBB;

/// Protocol version byte.
pub const PROTOCOL_VERSION: u8 = 0x02;

/// Start marker + length (2) + version + type.
pub const HEADER_SIZE: usize = 5;

/// Bytes in a frame besides the payload: header + crc + end marker.
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + 2;

/// Largest frame the 16-bit length field can describe.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Largest payload that fits in a frame.
pub const MAX_PAYLOAD: usize = MAX_FRAME_LEN - FRAME_OVERHEAD;

/// The length field value for a payload of `payload_len` bytes.
pub fn frame_len(payload_len: usize) -> Result<u16> {
    if payload_len > MAX_PAYLOAD {
        return Err(CodecError::PayloadTooLarge {
            size: payload_len,
            max: MAX_PAYLOAD,
        });
    }
    Ok((payload_len + FRAME_OVERHEAD) as u16)
}

/// Encode one frame into `dst`, returning the number of bytes appended.
///
/// Wire format:
/// ```text
/// ┌───────┬──────────┬─────────┬──────┬──────────┬─────┬──────┐
/// │ 0xAA  │ length   │ version │ type │ payload  │ crc │ 0xBB │
/// │ (1B)  │ (2B BE)  │ 0x02    │ (1B) │ (len-7)  │(1B) │ (1B) │
/// └───────┴──────────┴─────────┴──────┴──────────┴─────┴──────┘
/// ```
///
/// `length` counts the whole frame. The crc covers every byte of the frame
/// with its own slot set to `0x00`.
pub fn encode_frame(kind: MessageKind, payload: &[u8], dst: &mut BytesMut) -> Result<usize> {
    let length = frame_len(payload.len())?;
    let start = dst.len();

    dst.reserve(usize::from(length));
    dst.put_u8(START_MARKER);
    dst.put_u16(length);
    dst.put_u8(PROTOCOL_VERSION);
    dst.put_u8(kind.tag());
    dst.put_slice(payload);
    dst.put_u8(0x00);
    dst.put_u8(END_MARKER);

    let crc = crc8(&dst[start..]);
    let crc_at = dst.len() - 2;
    dst[crc_at] = crc;

    Ok(usize::from(length))
}

/// Encode one frame into a fresh buffer.
pub fn encode_to_bytes(kind: MessageKind, payload: &[u8]) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    encode_frame(kind, payload, &mut buf)?;
    Ok(buf.freeze())
}

/// The checksum a frame with these fields must carry.
///
/// Covers the start marker, the length field as received, version, type,
/// payload, a zeroed crc slot and the end marker.
pub fn frame_checksum(length: u16, version: u8, tag: u8, payload: &[u8]) -> u8 {
    let [len_hi, len_lo] = length.to_be_bytes();
    Crc8::new()
        .update(&[START_MARKER, len_hi, len_lo, version, tag])
        .update(payload)
        .update(&[0x00, END_MARKER])
        .finish()
}
