//! Deprecated version 1 layout.
//!
//! Version 1 frames predate message classes and data type tags:
//! ```text
//! ┌─────────────┬─────────┬─────────┬──────┬──────────┬───────────┐
//! │ MsgESSbegin │ Version │ Length  │ Comp │ Body     │ MsgESSend │
//! │ (11B)       │ (4B)=1  │ (4B)    │ (1B) │ (Length) │ (9B)      │
//! └─────────────┴─────────┴─────────┴──────┴──────────┴───────────┘
//! ```
//! They are only written when explicitly requested and only decoded when
//! [`FrameConfig::accept_legacy`](crate::FrameConfig::accept_legacy) is set.

use bytes::{BufMut, BytesMut};

use crate::codec::{body_len_u32, BEGIN_MARKER, END_MARKER, FOOTER_SIZE};
use crate::error::Result;

/// Version number of the legacy layout.
pub const LEGACY_PROTOCOL_VERSION: u32 = 1;

/// Legacy header: marker (11) + version (4) + length (4) + flag (1).
pub const LEGACY_HEADER_SIZE: usize = 20;

/// Encode a body using the legacy layout.
pub fn encode_legacy_frame(body: &[u8], compressed: bool, dst: &mut BytesMut) -> Result<()> {
    let body_len = body_len_u32(body)?;
    dst.reserve(LEGACY_HEADER_SIZE + body.len() + FOOTER_SIZE);
    dst.put_slice(BEGIN_MARKER);
    dst.put_u32(LEGACY_PROTOCOL_VERSION);
    dst.put_u32(body_len);
    dst.put_u8(u8::from(compressed));
    dst.put_slice(body);
    dst.put_slice(END_MARKER);
    Ok(())
}
