//! Session handling for crcframe endpoints.
//!
//! The codec is stateless. This crate adds the one piece of state the
//! protocol has (whether the session is open) and the device-side responder
//! behavior: redundant `open`/`close` are answered with
//! `ack(OPENED)`/`ack(CLOSED)`, and a `test` frame triggers the self-check
//! stream.

pub mod error;
pub mod selftest;
pub mod session;

#[cfg(feature = "async")]
pub mod actor;

pub use error::{Result, SessionError};
pub use selftest::{run_checks, SelfCheck, CHECK_COUNT};
pub use session::{Session, SessionConfig, SessionState};

#[cfg(feature = "async")]
pub use actor::SessionHandle;
