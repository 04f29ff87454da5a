use std::io::{ErrorKind, Read, Write};

use bytes::{Bytes, BytesMut};

use crate::error::{Result, TransportError};

/// A blocking duplex byte link.
///
/// `read_exact` blocks until the whole buffer is filled; `write_all` blocks
/// until the whole buffer has been handed to the link and flushed. Either
/// fails with a [`TransportError`] on disconnect or I/O fault.
///
/// Every `Read + Write` type is a `Transport`.
pub trait Transport {
    /// Fill `buf` completely from the link.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Write all of `buf` to the link and flush it.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Read exactly `n` bytes.
    fn read(&mut self, n: usize) -> Result<Bytes> {
        let mut buf = BytesMut::zeroed(n);
        self.read_exact(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Read a single byte.
    fn read_u8(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }
}

impl<T: Read + Write> Transport for T {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match Read::read(self, &mut buf[filled..]) {
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(classify_io(err)),
            }
        }
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < buf.len() {
            match Write::write(self, &buf[offset..]) {
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(classify_io(err)),
            }
        }

        loop {
            match Write::flush(self) {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(classify_io(err)),
            }
        }
    }
}

/// Map an I/O error onto the transport taxonomy.
///
/// Timeouts configured on sockets surface as `WouldBlock` on Unix and
/// `TimedOut` elsewhere.
pub(crate) fn classify_io(err: std::io::Error) -> TransportError {
    match err.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout,
        ErrorKind::UnexpectedEof
        | ErrorKind::BrokenPipe
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted => TransportError::Disconnected,
        _ => TransportError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn read_exact_count() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        let bytes = Transport::read(&mut cursor, 3).unwrap();
        assert_eq!(bytes.as_ref(), &[1, 2, 3]);
        assert_eq!(cursor.read_u8().unwrap(), 4);
    }

    #[test]
    fn read_zero_bytes_is_empty() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let bytes = Transport::read(&mut cursor, 0).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn eof_mid_read_is_disconnect() {
        let mut cursor = Cursor::new(vec![0xAA, 0x00]);
        let err = Transport::read(&mut cursor, 4).unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
    }

    #[test]
    fn partial_reads_are_stitched() {
        let mut reader = ByteByByte {
            bytes: b"slow link".to_vec(),
            pos: 0,
            written: Vec::new(),
        };
        let bytes = Transport::read(&mut reader, 9).unwrap();
        assert_eq!(bytes.as_ref(), b"slow link");
    }

    #[test]
    fn interrupted_read_retries() {
        let mut link = InterruptOnce {
            interrupted: false,
            bytes: vec![7, 8],
            pos: 0,
        };
        let bytes = Transport::read(&mut link, 2).unwrap();
        assert_eq!(bytes.as_ref(), &[7, 8]);
    }

    #[test]
    fn would_block_is_timeout() {
        let mut link = AlwaysWouldBlock;
        let err = link.read_u8().unwrap_err();
        assert!(matches!(err, TransportError::Timeout));
    }

    #[test]
    fn write_all_writes_everything() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        Transport::write_all(&mut cursor, b"frame bytes").unwrap();
        assert_eq!(cursor.into_inner(), b"frame bytes");
    }

    #[test]
    fn zero_length_write_is_disconnect() {
        let mut link = ZeroWriter;
        let err = Transport::write_all(&mut link, b"x").unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
    }

    #[test]
    fn broken_pipe_is_disconnect() {
        let err = classify_io(std::io::Error::from(ErrorKind::BrokenPipe));
        assert!(matches!(err, TransportError::Disconnected));
        let err = classify_io(std::io::Error::from(ErrorKind::PermissionDenied));
        assert!(matches!(err, TransportError::Io(_)));
    }

    struct ByteByByte {
        bytes: Vec<u8>,
        pos: usize,
        written: Vec<u8>,
    }

    impl Read for ByteByByte {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    impl Write for ByteByByte {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct InterruptOnce {
        interrupted: bool,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptOnce {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            let n = (self.bytes.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    impl Write for InterruptOnce {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct AlwaysWouldBlock;

    impl Read for AlwaysWouldBlock {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }
    }

    impl Write for AlwaysWouldBlock {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Read for ZeroWriter {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
