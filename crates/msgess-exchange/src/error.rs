use std::fmt;

use msgess_frame::{CompressionError, DataType, FrameError};
use msgess_transport::TransportError;

/// Coarse classification of an [`ExchangeError`].
///
/// Callers branch on this rather than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or incompatible frame: bad marker, version mismatch, unexpected data type.
    Protocol,
    /// Underlying I/O failure, premature close, or timeout.
    Transport,
    /// Body failed to compress or decompress, or an invalid level was requested.
    Compression,
    /// UTF-8 or JSON (de)serialization failure, or a JSON value of the wrong shape.
    Encoding,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Protocol => "protocol",
            ErrorKind::Transport => "transport",
            ErrorKind::Compression => "compression",
            ErrorKind::Encoding => "encoding",
        })
    }
}

/// Errors that can occur in message exchange operations.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// Frame-level error (structure or transport).
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Compression or decompression failed.
    #[error("compression error: {0}")]
    Compression(#[from] CompressionError),

    /// The frame carries a different data type than the operation expects.
    #[error("unexpected data type (expected {expected}, found tag {found})")]
    UnexpectedDataType { expected: DataType, found: u8 },

    /// The body is not valid UTF-8.
    #[error("invalid utf-8 in message body: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON value has the wrong shape for the operation.
    #[error("expected a json {expected}, found {found}")]
    JsonShape {
        expected: &'static str,
        found: &'static str,
    },

    /// Closing the transport failed.
    #[error("close failed: {0}")]
    Close(#[source] TransportError),
}

impl ExchangeError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExchangeError::Frame(err) if err.is_protocol() => ErrorKind::Protocol,
            ExchangeError::Frame(_) | ExchangeError::Close(_) => ErrorKind::Transport,
            ExchangeError::UnexpectedDataType { .. } => ErrorKind::Protocol,
            ExchangeError::Compression(_) => ErrorKind::Compression,
            ExchangeError::Utf8(_) | ExchangeError::Json(_) | ExchangeError::JsonShape { .. } => {
                ErrorKind::Encoding
            }
        }
    }

    /// Returns true if the peer closed the connection cleanly between messages.
    pub fn is_peer_closed(&self) -> bool {
        matches!(self, ExchangeError::Frame(FrameError::PeerClosed))
    }
}

impl From<TransportError> for ExchangeError {
    fn from(err: TransportError) -> Self {
        ExchangeError::Frame(FrameError::Transport(err))
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
