use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};

use tracing::debug;

/// A connected, reliable byte stream that frames can be exchanged over.
///
/// All operations block. Implementations must deliver bytes in order and
/// without loss (TCP, Unix stream sockets, pipes, TLS sessions).
pub trait Transport {
    /// Receive up to `buf.len()` bytes.
    ///
    /// Returns `Ok(0)` once the peer has closed the stream.
    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Send the whole of `data`, blocking until every byte is accepted.
    fn send_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Close the stream in both directions.
    fn close(&mut self) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).receive(buf)
    }

    fn send_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).send_all(data)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).receive(buf)
    }

    fn send_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).send_all(data)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl Transport for TcpStream {
    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_retrying(self, buf)
    }

    fn send_all(&mut self, data: &[u8]) -> io::Result<()> {
        write_all_flushed(self, data)
    }

    fn close(&mut self) -> io::Result<()> {
        debug!(peer = ?self.peer_addr().ok(), "closing tcp transport");
        shutdown_ignoring_disconnect(self.shutdown(Shutdown::Both))
    }
}

#[cfg(unix)]
impl Transport for std::os::unix::net::UnixStream {
    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_retrying(self, buf)
    }

    fn send_all(&mut self, data: &[u8]) -> io::Result<()> {
        write_all_flushed(self, data)
    }

    fn close(&mut self) -> io::Result<()> {
        debug!("closing unix stream transport");
        shutdown_ignoring_disconnect(self.shutdown(Shutdown::Both))
    }
}

/// Adapts any `Read + Write` stream into a [`Transport`].
///
/// Useful for streams the crate has no native impl for, such as TLS sessions
/// or in-memory buffers. Closing flushes the stream and refuses further I/O;
/// the stream itself is released when the adapter is dropped.
pub struct StreamTransport<S> {
    inner: S,
    closed: bool,
}

impl<S: Read + Write> StreamTransport<S> {
    /// Wrap a stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consume the adapter and return the inner stream.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Whether [`Transport::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(
                ErrorKind::NotConnected,
                "stream transport is closed",
            ));
        }
        Ok(())
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ensure_open()?;
        read_retrying(&mut self.inner, buf)
    }

    fn send_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.ensure_open()?;
        write_all_flushed(&mut self.inner, data)
    }

    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

impl<S> std::fmt::Debug for StreamTransport<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamTransport")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

fn read_retrying<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}

fn write_all_flushed<W: Write + ?Sized>(writer: &mut W, data: &[u8]) -> io::Result<()> {
    // write_all already retries Interrupted and reports WriteZero on a dead peer.
    writer.write_all(data)?;
    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}

fn shutdown_ignoring_disconnect(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if err.kind() == ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}
