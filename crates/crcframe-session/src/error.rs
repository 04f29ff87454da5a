/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Codec-level error (includes transport failures).
    #[error("codec error: {0}")]
    Codec(#[from] crcframe_codec::CodecError),

    /// The task owning the session has stopped.
    #[error("session actor has shut down")]
    ActorGone,
}

impl From<crcframe_transport::TransportError> for SessionError {
    fn from(err: crcframe_transport::TransportError) -> Self {
        SessionError::Codec(err.into())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
