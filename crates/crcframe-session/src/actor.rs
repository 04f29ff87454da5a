//! Single-owner async front end for a [`Session`].
//!
//! The session lives on a blocking task and serves requests from an mpsc
//! queue one at a time. A pending `recv` holds the queue until a frame
//! arrives.

use crcframe_codec::{Decoded, ErrorCode};
use crcframe_transport::Transport;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{Result, SessionError};
use crate::session::{Session, SessionState};

const QUEUE_DEPTH: usize = 32;

type Reply<T> = oneshot::Sender<Result<T>>;

enum Request {
    Connect(Reply<()>),
    Disconnect(Reply<()>),
    Send(Vec<u8>, Reply<usize>),
    Echo(Vec<u8>, Reply<usize>),
    Ack(ErrorCode, Reply<usize>),
    RequestTest(Reply<usize>),
    Recv(Reply<Decoded>),
    State(oneshot::Sender<SessionState>),
}

/// Cloneable handle to a session running on its own blocking task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Request>,
}

impl SessionHandle {
    /// Move `session` onto a blocking task.
    ///
    /// The task ends once every handle is dropped and yields the session
    /// back through the join handle.
    pub fn spawn<T>(session: Session<T>) -> (Self, JoinHandle<Session<T>>)
    where
        T: Transport + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let task = tokio::task::spawn_blocking(move || serve(session, rx));
        (Self { tx }, task)
    }

    pub async fn connect(&self) -> Result<()> {
        self.call(Request::Connect).await
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.call(Request::Disconnect).await
    }

    pub async fn send(&self, payload: impl Into<Vec<u8>>) -> Result<usize> {
        let payload = payload.into();
        self.call(|reply| Request::Send(payload, reply)).await
    }

    pub async fn echo(&self, payload: impl Into<Vec<u8>>) -> Result<usize> {
        let payload = payload.into();
        self.call(|reply| Request::Echo(payload, reply)).await
    }

    pub async fn ack(&self, code: ErrorCode) -> Result<usize> {
        self.call(|reply| Request::Ack(code, reply)).await
    }

    pub async fn request_test(&self) -> Result<usize> {
        self.call(Request::RequestTest).await
    }

    /// Wait for the next frame.
    ///
    /// Dropping this future after the request is queued does not cancel the
    /// read. The frame it returns is discarded.
    pub async fn recv(&self) -> Result<Decoded> {
        self.call(Request::Recv).await
    }

    pub async fn state(&self) -> Result<SessionState> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(Request::State(tx))
            .await
            .map_err(|_| SessionError::ActorGone)?;
        rx.await.map_err(|_| SessionError::ActorGone)
    }

    async fn call<R>(&self, make: impl FnOnce(Reply<R>) -> Request) -> Result<R> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(make(tx))
            .await
            .map_err(|_| SessionError::ActorGone)?;
        rx.await.map_err(|_| SessionError::ActorGone)?
    }
}

fn serve<T: Transport>(mut session: Session<T>, mut rx: mpsc::Receiver<Request>) -> Session<T> {
    while let Some(request) = rx.blocking_recv() {
        // A dropped reply receiver only means the caller stopped waiting.
        match request {
            Request::Connect(reply) => {
                let _ = reply.send(session.connect());
            }
            Request::Disconnect(reply) => {
                let _ = reply.send(session.disconnect());
            }
            Request::Send(payload, reply) => {
                let _ = reply.send(session.send(&payload));
            }
            Request::Echo(payload, reply) => {
                let _ = reply.send(session.echo(&payload));
            }
            Request::Ack(code, reply) => {
                let _ = reply.send(session.ack(code));
            }
            Request::RequestTest(reply) => {
                let _ = reply.send(session.request_test());
            }
            Request::Recv(reply) => {
                if let Err(Ok(decoded)) = reply.send(session.recv()) {
                    debug!(kind = %decoded.message.kind(), "receiver gone, frame dropped");
                }
            }
            Request::State(reply) => {
                let _ = reply.send(session.state());
            }
        }
    }
    debug!("all session handles dropped");
    session
}
