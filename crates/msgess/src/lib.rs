//! Message framing over byte streams.
//!
//! msgess sends whole, typed messages over TCP, Unix sockets, or any other
//! reliable byte stream. Each message carries a message class for
//! application-level multiplexing, a data type tag, and an optionally
//! zlib-compressed body, wrapped in begin and end markers.
//!
//! # Crate Structure
//!
//! - [`transport`]: blocking byte-stream abstraction and exact-length receive
//! - [`frame`]: wire format, compression, frame reader and writer
//! - [`exchange`]: typed send/receive of binary, text, and JSON messages
//!
//! The most used types are re-exported at the root.

/// Re-export transport types.
pub mod transport {
    pub use msgess_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use msgess_frame::*;
}

/// Re-export exchange types.
pub mod exchange {
    pub use msgess_exchange::*;
}

pub use msgess_exchange::{
    CompressionSettings, ErrorKind, ExchangeConfig, ExchangeError, JsonArray, JsonObject,
    MessageExchange, Protocol, Result,
};
pub use msgess_transport::{StreamTransport, Transport};
