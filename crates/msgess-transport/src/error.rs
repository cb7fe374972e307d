/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer closed the stream before the requested bytes arrived.
    #[error("connection closed prematurely ({received} of {expected} bytes received)")]
    ConnectionClosed { expected: usize, received: usize },

    /// Receiving from the underlying stream failed.
    #[error("failed to receive data from the transport: {0}")]
    Receive(#[source] std::io::Error),

    /// Sending to the underlying stream failed.
    #[error("failed to send data to the transport: {0}")]
    Send(#[source] std::io::Error),

    /// Closing the underlying stream failed.
    #[error("failed to close the transport: {0}")]
    Close(#[source] std::io::Error),

    /// The transport delivered a different number of bytes than requested.
    #[error("transport delivered {received} bytes, expected exactly {expected}")]
    LengthMismatch { expected: usize, received: usize },
}

impl TransportError {
    /// The originating I/O error, if any.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            TransportError::Receive(err) | TransportError::Send(err) | TransportError::Close(err) => {
                Some(err)
            }
            TransportError::ConnectionClosed { .. } | TransportError::LengthMismatch { .. } => None,
        }
    }

    /// Returns true if the underlying stream reported a read/write deadline.
    pub fn is_timeout(&self) -> bool {
        self.io_error().is_some_and(|err| {
            matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        })
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
