//! Open/closed state on top of [`PacketCodec`].

use std::fmt;

use crcframe_codec::{AckOutcome, CodecConfig, Decoded, ErrorCode, Message, PacketCodec};
use crcframe_transport::Transport;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::selftest::run_checks;

/// Whether the session is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Closed,
    Open,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Closed => "closed",
            SessionState::Open => "open",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Codec limits.
    pub codec: CodecConfig,
    /// Answer `test` requests with the self-check stream.
    pub answer_test: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            codec: CodecConfig::default(),
            answer_test: true,
        }
    }
}

impl SessionConfig {
    pub fn with_codec(mut self, codec: CodecConfig) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_answer_test(mut self, answer_test: bool) -> Self {
        self.answer_test = answer_test;
        self
    }
}

/// One endpoint of a crcframe link.
///
/// The session starts closed. `connect`/`disconnect` drive the state from
/// this side; `recv` applies the peer's `open`/`close` frames and answers
/// redundant ones with `ack(OPENED)` / `ack(CLOSED)`.
pub struct Session<T> {
    codec: PacketCodec<T>,
    state: SessionState,
    answer_test: bool,
}

impl<T> Session<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Self {
            codec: PacketCodec::with_config(transport, config.codec),
            state: SessionState::Closed,
            answer_test: config.answer_test,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn codec(&self) -> &PacketCodec<T> {
        &self.codec
    }

    pub fn codec_mut(&mut self) -> &mut PacketCodec<T> {
        &mut self.codec
    }

    pub fn into_inner(self) -> T {
        self.codec.into_inner()
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            info!(from = %self.state, to = %state, "session state changed");
            self.state = state;
        }
    }
}

impl<T: Transport> Session<T> {
    /// Send `open` and mark the session open.
    pub fn connect(&mut self) -> Result<()> {
        self.codec.encode_open()?;
        self.set_state(SessionState::Open);
        Ok(())
    }

    /// Send `close` and mark the session closed.
    pub fn disconnect(&mut self) -> Result<()> {
        self.codec.encode_close()?;
        self.set_state(SessionState::Closed);
        Ok(())
    }

    /// Send a `data` frame.
    pub fn send(&mut self, payload: &[u8]) -> Result<usize> {
        if !self.is_open() {
            warn!(len = payload.len(), "sending data on a closed session");
        }
        Ok(self.codec.encode_data(payload)?)
    }

    /// Ask the peer to send `payload` back as data.
    pub fn echo(&mut self, payload: &[u8]) -> Result<usize> {
        Ok(self.codec.encode_echo(payload)?)
    }

    pub fn ack(&mut self, code: ErrorCode) -> Result<usize> {
        Ok(self.codec.encode_ack(code)?)
    }

    /// Ask the peer to run its self-checks.
    pub fn request_test(&mut self) -> Result<usize> {
        Ok(self.codec.encode_test()?)
    }

    /// Decode one frame and apply the responder policy.
    pub fn recv(&mut self) -> Result<Decoded> {
        let decoded = self.codec.decode()?;

        match &decoded.message {
            Message::Open => {
                if self.is_open() {
                    debug!("open received while already open");
                    self.codec.encode_ack(ErrorCode::Opened)?;
                } else {
                    self.set_state(SessionState::Open);
                }
            }
            Message::Close => {
                if self.is_open() {
                    self.set_state(SessionState::Closed);
                } else {
                    debug!("close received while already closed");
                    self.codec.encode_ack(ErrorCode::Closed)?;
                }
            }
            Message::Ack(AckOutcome::Known(ErrorCode::Opened)) => {
                self.set_state(SessionState::Open);
            }
            Message::Ack(AckOutcome::Known(ErrorCode::Closed)) => {
                self.set_state(SessionState::Closed);
            }
            Message::Test if self.answer_test => self.answer_self_test()?,
            _ => {}
        }

        Ok(decoded)
    }

    /// Send a `test` request and collect the next `count` frames.
    pub fn run_test(&mut self, count: usize) -> Result<Vec<Decoded>> {
        self.request_test()?;
        let mut replies = Vec::with_capacity(count);
        for _ in 0..count {
            replies.push(self.recv()?);
        }
        Ok(replies)
    }

    fn answer_self_test(&mut self) -> Result<()> {
        let checks = run_checks();
        let failed = checks.iter().filter(|check| !check.passed).count();
        info!(checks = checks.len(), failed, "answering test request");
        for check in checks {
            self.codec.encode_data(check.payload().as_bytes())?;
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("answer_test", &self.answer_test)
            .finish_non_exhaustive()
    }
}
