//! MsgESS wire format: typed, optionally compressed message frames.
//!
//! Every message travels as one frame:
//! - An 11-byte begin marker (`MsgESSbegin`)
//! - A 4-byte big-endian protocol version
//! - A 4-byte big-endian body length
//! - A 4-byte big-endian message class for application multiplexing
//! - A 1-byte compressed flag and a 1-byte data type tag
//! - The body, then a 9-byte end marker (`MsgESSend`)
//!
//! The deprecated version 1 layout lives in [`legacy`].

pub mod codec;
pub mod compression;
pub mod data_type;
pub mod error;
pub mod legacy;
pub mod reader;
pub mod writer;

pub use codec::{
    encode_frame, Frame, FrameConfig, FrameHeader, BEGIN_MARKER, END_MARKER, FOOTER_SIZE,
    HEADER_SIZE, PROTOCOL_VERSION,
};
pub use compression::{
    compress, decompress, decompress_bounded, CompressionError, DEFAULT_COMPRESSION_LEVEL,
};
pub use data_type::DataType;
pub use error::{FrameError, Result};
pub use legacy::{encode_legacy_frame, LEGACY_HEADER_SIZE, LEGACY_PROTOCOL_VERSION};
pub use reader::read_frame;
pub use writer::{write_frame, write_legacy_frame};
