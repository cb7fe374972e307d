use msgess_transport::TransportError;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame does not start with the `MsgESSbegin` marker.
    #[error("invalid header")]
    InvalidHeader,

    /// The peer speaks a protocol version this side does not accept.
    #[error("incompatible version (expected {expected}, found {found})")]
    IncompatibleVersion { expected: u32, found: u32 },

    /// The compressed flag is neither 0 nor 1.
    #[error("invalid compressed flag {0:#04x}")]
    InvalidCompressedFlag(u8),

    /// The frame does not end with the `MsgESSend` marker.
    #[error("invalid footer")]
    InvalidFooter,

    /// The body exceeds what the wire format or local configuration allows.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The peer closed the stream cleanly between frames.
    #[error("connection closed by peer")]
    PeerClosed,

    /// The underlying transport failed, including a close mid-frame.
    #[error("frame transport error: {0}")]
    Transport(#[from] TransportError),
}

impl FrameError {
    /// Returns true for malformed or incompatible frames, as opposed to I/O failures.
    pub fn is_protocol(&self) -> bool {
        !matches!(self, FrameError::PeerClosed | FrameError::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
