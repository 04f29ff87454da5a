//! CRC-8 checksum engine.
//!
//! Polynomial `0x07` (x⁸ + x² + x + 1), initial value `0x00`, no reflection,
//! no final XOR. This is the CRC-8/SMBUS parameterization.

use std::fmt;

use ::crc::{Crc, Digest, CRC_8_SMBUS};

/// Generator polynomial, without the implicit x⁸ term.
pub const POLYNOMIAL: u8 = 0x07;

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// Incremental CRC-8 digest.
///
/// Feeding data in several `update` calls gives the same result as one call
/// over the concatenation.
#[derive(Clone)]
pub struct Crc8 {
    digest: Digest<'static, u8>,
}

impl Crc8 {
    /// A fresh digest (register `0x00`).
    pub fn new() -> Self {
        Self {
            digest: CRC8.digest(),
        }
    }

    /// Feed bytes into the digest.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.digest.update(data);
        self
    }

    /// The checksum of everything fed so far.
    pub fn finish(&self) -> u8 {
        self.digest.clone().finalize()
    }
}

impl Default for Crc8 {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Crc8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crc8")
            .field("value", &self.finish())
            .finish()
    }
}

/// CRC-8 of `data`. Total over any input; `crc8(&[]) == 0`.
pub fn crc8(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(crc8(&[]), 0x00);
    }

    #[test]
    fn single_byte() {
        assert_eq!(crc8(&[0x01]), 0x07);
    }

    #[test]
    fn check_value() {
        assert_eq!(crc8(b"123456789"), 0xF4);
    }

    #[test]
    fn reference_vectors() {
        let ascending: Vec<u8> = (0..=255).collect();
        assert_eq!(crc8(&[0x01, 0x02, 0x03, 0x04, 0x05]), 188);
        assert_eq!(crc8(&ascending), 20);
        assert_eq!(crc8(&[0x00; 256]), 0);
        assert_eq!(crc8(&[0xFF; 256]), 36);
        assert_eq!(crc8(b"hello"), 146);
        assert_eq!(crc8(b"00000"), 119);
        assert_eq!(crc8(b"The quick brown fox jumps over the lazy dog."), 131);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data = b"split across several updates";
        let mut digest = Crc8::new();
        for chunk in data.chunks(5) {
            digest.update(chunk);
        }
        assert_eq!(digest.finish(), crc8(data));
    }

    #[test]
    fn parameters_match_polynomial() {
        assert_eq!(CRC_8_SMBUS.poly, POLYNOMIAL);
        assert_eq!(CRC_8_SMBUS.init, 0x00);
        assert!(!CRC_8_SMBUS.refin);
        assert_eq!(CRC_8_SMBUS.xorout, 0x00);
    }

    #[test]
    fn finish_does_not_consume() {
        let mut digest = Crc8::default();
        digest.update(b"hel");
        let partial = digest.finish();
        digest.update(b"lo");
        assert_eq!(partial, crc8(b"hel"));
        assert_eq!(digest.finish(), crc8(b"hello"));
    }

    #[test]
    fn appending_checksum_yields_zero_remainder() {
        let mut data = b"hello".to_vec();
        data.push(crc8(&data));
        assert_eq!(crc8(&data), 0);
    }
}
