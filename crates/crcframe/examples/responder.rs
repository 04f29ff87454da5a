//! Minimal responder: accepts one endpoint and serves it until disconnect.
//!
//! Run with:
//!   cargo run --example responder
//!
//! In another terminal:
//!   cargo run --features cli -- send /tmp/crcframe-responder-<pid>/link.sock \
//!     --kind echo --data hello --wait 1

use std::fs;

use crcframe::codec::{CodecError, Message};
use crcframe::session::{Session, SessionError};
use crcframe::transport::{TransportError, UnixDomainSocket};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sock_dir = std::env::temp_dir().join(format!("crcframe-responder-{}", std::process::id()));
    fs::create_dir_all(&sock_dir)?;
    let sock_path = sock_dir.join("link.sock");

    let listener = UnixDomainSocket::bind(&sock_path)?;
    eprintln!("Listening on {}", sock_path.display());

    let mut session = Session::new(listener.accept()?);
    eprintln!("Endpoint connected");

    loop {
        match session.recv() {
            Ok(decoded) => {
                for fault in &decoded.faults {
                    eprintln!("  fault: {fault}");
                }
                match &decoded.message {
                    Message::Data(payload) => {
                        eprintln!("Received {} bytes of data", payload.len());
                    }
                    other => eprintln!("Received {} ({})", other.kind(), session.state()),
                }
            }
            Err(SessionError::Codec(CodecError::Transport(TransportError::Disconnected))) => {
                eprintln!("Endpoint disconnected");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    drop(listener);
    let _ = fs::remove_dir_all(&sock_dir);
    Ok(())
}
