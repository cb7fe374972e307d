//! Typed message exchange over a byte stream.
//!
//! Wrap any [`Transport`](msgess_transport::Transport) in a
//! [`MessageExchange`] to send and receive binary, text, and JSON messages,
//! each tagged with a caller-chosen message class.
//!
//! ```no_run
//! use std::net::TcpStream;
//!
//! use msgess_exchange::MessageExchange;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = TcpStream::connect("127.0.0.1:8080")?;
//! let mut exchange = MessageExchange::new(stream);
//!
//! exchange.send_json_object(&json!({"command": "status"}), 456)?;
//! let (reply, class) = exchange.receive_json_object()?;
//! println!("{class}: {reply:?}");
//!
//! exchange.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod exchange;
pub mod incoming;
mod json;
pub mod payload;

pub use config::{CompressionSettings, ExchangeConfig, Protocol};
pub use error::{ErrorKind, ExchangeError, Result};
pub use exchange::MessageExchange;
pub use incoming::Incoming;
pub use payload::{JsonArray, JsonObject, Payload};
