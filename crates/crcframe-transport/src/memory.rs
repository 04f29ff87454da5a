use std::collections::VecDeque;
use std::io::{Read, Write};

/// In-memory duplex link.
///
/// Reads drain a queue of inbound bytes (EOF once it is empty); writes append
/// to an outbound buffer that the test can inspect.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
}

impl MemoryTransport {
    /// An empty link.
    pub fn new() -> Self {
        Self::default()
    }

    /// A link whose peer has already sent `bytes`.
    pub fn with_inbound(bytes: impl AsRef<[u8]>) -> Self {
        let mut link = Self::new();
        link.push_inbound(bytes);
        link
    }

    /// Queue more bytes from the peer.
    pub fn push_inbound(&mut self, bytes: impl AsRef<[u8]>) {
        self.inbound.extend(bytes.as_ref());
    }

    /// Number of inbound bytes not yet read.
    pub fn remaining_inbound(&self) -> usize {
        self.inbound.len()
    }

    /// Everything written so far.
    pub fn outbound(&self) -> &[u8] {
        &self.outbound
    }

    /// Take everything written so far, leaving the buffer empty.
    pub fn take_outbound(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }
}

impl Read for MemoryTransport {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MemoryTransport {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::traits::Transport;

    #[test]
    fn reads_inbound_in_order() {
        let mut link = MemoryTransport::with_inbound([1u8, 2, 3]);
        link.push_inbound([4u8]);
        assert_eq!(Transport::read(&mut link, 4).unwrap().as_ref(), &[1, 2, 3, 4]);
        assert_eq!(link.remaining_inbound(), 0);
    }

    #[test]
    fn exhausted_inbound_is_disconnect() {
        let mut link = MemoryTransport::new();
        assert!(matches!(
            link.read_u8().unwrap_err(),
            TransportError::Disconnected
        ));
    }

    #[test]
    fn take_outbound_clears() {
        let mut link = MemoryTransport::new();
        Transport::write_all(&mut link, b"abc").unwrap();
        assert_eq!(link.outbound(), b"abc");
        assert_eq!(link.take_outbound(), b"abc");
        assert!(link.outbound().is_empty());
    }
}
