//! Drives a session from async code through `SessionHandle`.
//!
//! Both ends run in-process over a socket pair: the responder is a plain
//! blocking `Session` on a thread, the requester an actor handle.
//!
//! Run with:
//!   cargo run --example async-responder --features async

use std::thread;

use crcframe::codec::Message;
use crcframe::session::{SelfCheck, Session, SessionError, SessionHandle, CHECK_COUNT};
use crcframe::transport::LinkStream;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (near, far) = LinkStream::pair()?;

    // One test request and one echo request.
    let responder = thread::spawn(move || -> Result<(), SessionError> {
        let mut session = Session::new(far);
        for _ in 0..2 {
            session.recv()?;
        }
        Ok(())
    });

    let (handle, task) = SessionHandle::spawn(Session::new(near));
    println!("session is {}", handle.state().await?);

    handle.request_test().await?;
    let mut passed = 0;
    for _ in 0..CHECK_COUNT {
        let reply = handle.recv().await?;
        if let Some(check) = reply.message.data().and_then(|data| SelfCheck::parse(data)) {
            let verdict = if check.passed { "pass" } else { "FAIL" };
            println!("check {:>2}: {verdict}", check.id);
            passed += usize::from(check.passed);
        }
    }
    println!("{passed}/{CHECK_COUNT} checks passed");

    handle.echo("hello").await?;
    if let Message::Data(payload) = handle.recv().await?.message {
        println!("echo returned {:?}", String::from_utf8_lossy(&payload));
    }

    drop(handle);
    let _session = task.await?;
    responder.join().map_err(|_| "responder thread panicked")??;
    Ok(())
}
