//! Blocking byte-stream transport abstraction.
//!
//! The packet codec only needs two things from a link: read exactly `n`
//! bytes, and write a whole buffer. [`Transport`] captures that contract and
//! is implemented for every `Read + Write` type.
//!
//! Concrete links provided here:
//! - [`LinkStream`] over a character device (serial port) or a Unix socket
//! - [`UnixDomainSocket`] listener for local two-endpoint setups
//! - [`MemoryTransport`] for tests and demos
//!
//! Line settings of a serial device (baud rate, parity) are configured
//! outside this crate.

pub mod error;
pub mod memory;
pub mod stream;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use memory::MemoryTransport;
pub use stream::{LinkKind, LinkStream};
pub use traits::Transport;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
