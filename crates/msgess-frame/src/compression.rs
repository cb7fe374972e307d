//! zlib-wrapped deflate for frame bodies.
//!
//! Bodies are compressed as complete zlib streams, so any peer using a stock
//! zlib `compress`/`decompress` pair can read and write them.

use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

/// Level meaning "library default" (currently 6).
pub const DEFAULT_COMPRESSION_LEVEL: i32 = -1;

const INFLATE_CHUNK: usize = 16 * 1024;

/// Errors from compressing or decompressing a body.
#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    /// Level outside `-1..=9`.
    #[error("invalid compression level {0} (expected -1..=9)")]
    InvalidLevel(i32),

    /// The encoder failed.
    #[error("failed to compress the message body: {0}")]
    Compress(#[source] std::io::Error),

    /// The body is not a valid zlib stream (corrupt or truncated).
    #[error("failed to decompress the message body: {0}")]
    Decompress(#[source] std::io::Error),

    /// Decompressed output would exceed the configured limit.
    #[error("decompressed body exceeds {max} bytes")]
    TooLarge { max: usize },
}

pub type Result<T> = std::result::Result<T, CompressionError>;

/// Validate a level and map it onto flate2's scale.
pub fn level_to_compression(level: i32) -> Result<Compression> {
    match level {
        DEFAULT_COMPRESSION_LEVEL => Ok(Compression::default()),
        0..=9 => Ok(Compression::new(level as u32)),
        other => Err(CompressionError::InvalidLevel(other)),
    }
}

/// Compress `data` at `level` (`-1` for the default, `0..=9` otherwise).
pub fn compress(data: &[u8], level: i32) -> Result<Vec<u8>> {
    let compression = level_to_compression(level)?;
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2 + 16), compression);
    encoder.write_all(data).map_err(CompressionError::Compress)?;
    encoder.finish().map_err(CompressionError::Compress)
}

/// Decompress a complete zlib stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_bounded(data, usize::MAX)
}

/// Decompress a complete zlib stream, refusing to produce more than `max` bytes.
///
/// The stream must reach its end marker; running out of input first is an error.
pub fn decompress_bounded(data: &[u8], max: usize) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let mut out = Vec::with_capacity(data.len().saturating_mul(2).min(max).max(64));

    loop {
        if out.len() == out.capacity() {
            out.reserve(INFLATE_CHUNK);
        }

        let before_in = inflater.total_in();
        let before_out = inflater.total_out();
        let remaining = &data[before_in as usize..];
        let status = inflater
            .decompress_vec(remaining, &mut out, FlushDecompress::None)
            .map_err(|err| {
                CompressionError::Decompress(io::Error::new(io::ErrorKind::InvalidData, err))
            })?;

        if out.len() > max {
            return Err(CompressionError::TooLarge { max });
        }
        if status == Status::StreamEnd {
            return Ok(out);
        }

        let progressed = inflater.total_in() != before_in || inflater.total_out() != before_out;
        if !progressed && out.len() < out.capacity() {
            return Err(CompressionError::Decompress(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "compressed stream ended before its end marker",
            )));
        }
    }
}
