use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};

/// Which physical link a [`LinkStream`] wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// A character device such as `/dev/ttyACM0`.
    Device,
    /// A connected Unix domain stream socket.
    #[cfg(unix)]
    Unix,
}

impl LinkKind {
    /// Short name for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Device => "device",
            #[cfg(unix)]
            LinkKind::Unix => "unix",
        }
    }
}

/// A connected duplex link. Implements `Read + Write`, hence `Transport`.
pub struct LinkStream {
    inner: LinkStreamInner,
}

enum LinkStreamInner {
    Device(File),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            LinkStreamInner::Device(file) => file.read(buf),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            LinkStreamInner::Device(file) => file.write(buf),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            LinkStreamInner::Device(file) => file.flush(),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl LinkStream {
    /// Open a character device read/write.
    ///
    /// The device must already be configured (baud rate, raw mode).
    pub fn open_device(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| TransportError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(?path, "opened device link");
        Ok(Self {
            inner: LinkStreamInner::Device(file),
        })
    }

    /// Wrap a connected Unix domain socket stream.
    #[cfg(unix)]
    pub fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: LinkStreamInner::Unix(stream),
        }
    }

    /// A connected pair of Unix socket links, useful for running two
    /// endpoints in one process.
    #[cfg(unix)]
    pub fn pair() -> Result<(Self, Self)> {
        let (left, right) = std::os::unix::net::UnixStream::pair()?;
        Ok((Self::from_unix(left), Self::from_unix(right)))
    }

    /// The kind of link.
    pub fn kind(&self) -> LinkKind {
        match &self.inner {
            LinkStreamInner::Device(_) => LinkKind::Device,
            #[cfg(unix)]
            LinkStreamInner::Unix(_) => LinkKind::Unix,
        }
    }

    /// Set read timeout on the underlying link.
    ///
    /// Device links ignore this; their timing is governed by the line
    /// discipline (`VMIN`/`VTIME`) configured outside this crate.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            LinkStreamInner::Device(_) => {
                debug!("read timeout not applicable to device link");
                Ok(())
            }
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying link.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            LinkStreamInner::Device(_) => {
                debug!("write timeout not applicable to device link");
                Ok(())
            }
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this link (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let inner = match &self.inner {
            LinkStreamInner::Device(file) => LinkStreamInner::Device(file.try_clone()?),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => LinkStreamInner::Unix(stream.try_clone()?),
        };
        Ok(Self { inner })
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkStream")
            .field("kind", &self.kind().as_str())
            .finish()
    }
}
