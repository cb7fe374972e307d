//! Blocking byte-stream transport abstraction.
//!
//! MsgESS frames ride on any reliable, ordered byte stream. This crate is the
//! lowest layer: it defines the [`Transport`] capability the codec consumes,
//! adapters for the standard library streams, and [`receive_exact`], the loop
//! that turns bounded receives into exact-length reads.
//!
//! Opening, accepting, and configuring connections is left to the caller.

pub mod error;
pub mod exact;
pub mod traits;

pub use error::{Result, TransportError};
pub use exact::{receive_exact, MAX_RECEIVE_CHUNK};
pub use traits::{StreamTransport, Transport};
