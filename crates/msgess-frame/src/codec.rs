use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::data_type::DataType;
use crate::error::{FrameError, Result};
use crate::legacy::{LEGACY_HEADER_SIZE, LEGACY_PROTOCOL_VERSION};

/// Marker that opens every frame.
pub const BEGIN_MARKER: &[u8; 11] = b"MsgESSbegin";

/// Marker that closes every frame.
pub const END_MARKER: &[u8; 9] = b"MsgESSend";

/// Protocol version written by this implementation.
pub const PROTOCOL_VERSION: u32 = 2;

/// Canonical header: marker (11) + version (4) + length (4) + class (4) + flag (1) + type (1).
pub const HEADER_SIZE: usize = 25;

/// Footer: end marker (9).
pub const FOOTER_SIZE: usize = END_MARKER.len();

/// Marker plus version; enough to decide which layout follows.
pub(crate) const PREFIX_SIZE: usize = BEGIN_MARKER.len() + 4;

/// A decoded message frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Protocol version the frame was sent with.
    pub version: u32,
    /// Application-defined multiplexing tag. Always 0 for legacy frames.
    pub message_class: u32,
    /// Whether `body` is still deflate-compressed.
    pub compressed: bool,
    /// Raw data type tag; `None` for legacy frames, which carry none.
    ///
    /// Unknown tags are kept as-is so the caller can report them.
    pub data_type: Option<u8>,
    /// The body exactly as transmitted.
    pub body: Bytes,
}

impl Frame {
    /// Whether this frame used the version 1 layout.
    pub fn is_legacy(&self) -> bool {
        self.version == LEGACY_PROTOCOL_VERSION
    }

    /// The total wire size of this frame (header + body + footer).
    pub fn wire_size(&self) -> usize {
        header_size(self.version) + self.body.len() + FOOTER_SIZE
    }
}

/// The fixed-width fields that precede a frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u32,
    pub body_len: u32,
    pub message_class: u32,
    pub compressed: bool,
    pub data_type: Option<u8>,
}

impl FrameHeader {
    /// Parse and validate a complete header for either accepted layout.
    ///
    /// Checks run in wire order: begin marker, version, then the compressed flag.
    pub fn parse(header: &[u8], config: &FrameConfig) -> Result<Self> {
        if header.len() < PREFIX_SIZE {
            return Err(FrameError::InvalidHeader);
        }
        let version = check_prefix(header, config)?;
        if header.len() != header_size(version) {
            return Err(FrameError::InvalidHeader);
        }

        let mut fields = &header[PREFIX_SIZE..];
        let body_len = fields.get_u32();
        let (message_class, flag, data_type) = if version == LEGACY_PROTOCOL_VERSION {
            (0, fields.get_u8(), None)
        } else {
            let class = fields.get_u32();
            let flag = fields.get_u8();
            (class, flag, Some(fields.get_u8()))
        };

        Ok(Self {
            version,
            body_len,
            message_class,
            compressed: parse_compressed_flag(flag)?,
            data_type,
        })
    }

    /// Body length as a `usize`, rejected if it exceeds the configured limit.
    pub fn checked_body_len(&self, config: &FrameConfig) -> Result<usize> {
        let size = self.body_len as usize;
        if size > config.max_body_size {
            return Err(FrameError::PayloadTooLarge {
                size,
                max: config.max_body_size,
            });
        }
        Ok(size)
    }

    /// Attach a body to this header.
    pub fn into_frame(self, body: Bytes) -> Frame {
        Frame {
            version: self.version,
            message_class: self.message_class,
            compressed: self.compressed,
            data_type: self.data_type,
            body,
        }
    }
}

/// Configuration for the frame decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Largest body accepted, both as transmitted and after decompression.
    /// Default: `u32::MAX`, the most the length field can describe.
    pub max_body_size: usize,
    /// Also decode version 1 frames. Default: false.
    pub accept_legacy: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_body_size: u32::MAX as usize,
            accept_legacy: false,
        }
    }
}

/// Encode a frame into the wire format.
///
/// Wire format (all integers big-endian):
/// ```text
/// ┌─────────────┬─────────┬─────────┬─────────┬──────┬──────┬──────────┬───────────┐
/// │ MsgESSbegin │ Version │ Length  │ Class   │ Comp │ Type │ Body     │ MsgESSend │
/// │ (11B)       │ (4B)    │ (4B)    │ (4B)    │ (1B) │ (1B) │ (Length) │ (9B)      │
/// └─────────────┴─────────┴─────────┴─────────┴──────┴──────┴──────────┴───────────┘
/// ```
pub fn encode_frame(
    body: &[u8],
    message_class: u32,
    data_type: DataType,
    compressed: bool,
    dst: &mut BytesMut,
) -> Result<()> {
    let body_len = body_len_u32(body)?;
    dst.reserve(HEADER_SIZE + body.len() + FOOTER_SIZE);
    dst.put_slice(BEGIN_MARKER);
    dst.put_u32(PROTOCOL_VERSION);
    dst.put_u32(body_len);
    dst.put_u32(message_class);
    dst.put_u8(u8::from(compressed));
    dst.put_u8(data_type.tag());
    dst.put_slice(body);
    dst.put_slice(END_MARKER);
    Ok(())
}

/// Validate the begin marker and version; returns the version.
pub(crate) fn check_prefix(prefix: &[u8], config: &FrameConfig) -> Result<u32> {
    if &prefix[..BEGIN_MARKER.len()] != BEGIN_MARKER {
        return Err(FrameError::InvalidHeader);
    }

    let version = (&prefix[BEGIN_MARKER.len()..PREFIX_SIZE]).get_u32();
    let accepted = version == PROTOCOL_VERSION
        || (config.accept_legacy && version == LEGACY_PROTOCOL_VERSION);
    if !accepted {
        return Err(FrameError::IncompatibleVersion {
            expected: PROTOCOL_VERSION,
            found: version,
        });
    }
    Ok(version)
}

pub(crate) fn check_footer(footer: &[u8]) -> Result<()> {
    if footer != END_MARKER {
        return Err(FrameError::InvalidFooter);
    }
    Ok(())
}

pub(crate) fn header_size(version: u32) -> usize {
    if version == LEGACY_PROTOCOL_VERSION {
        LEGACY_HEADER_SIZE
    } else {
        HEADER_SIZE
    }
}

pub(crate) fn body_len_u32(body: &[u8]) -> Result<u32> {
    u32::try_from(body.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: body.len(),
        max: u32::MAX as usize,
    })
}

fn parse_compressed_flag(flag: u8) -> Result<bool> {
    match flag {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(FrameError::InvalidCompressedFlag(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::encode_legacy_frame;

    fn encoded(body: &[u8], message_class: u32, data_type: DataType, compressed: bool) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_frame(body, message_class, data_type, compressed, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_encode_matches_wire_layout() {
        let buf = encoded(br#"{"x": 1}"#, 42, DataType::JsonObject, false);

        let mut expected = Vec::new();
        expected.extend_from_slice(b"MsgESSbegin");
        expected.extend_from_slice(&[0, 0, 0, 2]);
        expected.extend_from_slice(&[0, 0, 0, 8]);
        expected.extend_from_slice(&[0, 0, 0, 42]);
        expected.extend_from_slice(&[0x00, 0x04]);
        expected.extend_from_slice(br#"{"x": 1}"#);
        expected.extend_from_slice(b"MsgESSend");

        assert_eq!(buf.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_header_fields_roundtrip() {
        let buf = encoded(b"hello, msgess!", 7, DataType::Binary, true);
        assert_eq!(buf.len(), HEADER_SIZE + 14 + FOOTER_SIZE);

        let header = FrameHeader::parse(&buf[..HEADER_SIZE], &FrameConfig::default()).unwrap();
        assert_eq!(header.version, PROTOCOL_VERSION);
        assert_eq!(header.message_class, 7);
        assert!(header.compressed);
        assert_eq!(header.data_type, Some(DataType::Binary.tag()));

        let body_len = header.checked_body_len(&FrameConfig::default()).unwrap();
        let body = Bytes::copy_from_slice(&buf[HEADER_SIZE..HEADER_SIZE + body_len]);
        check_footer(&buf[HEADER_SIZE + body_len..]).unwrap();

        let frame = header.into_frame(body);
        assert_eq!(frame.body.as_ref(), b"hello, msgess!");
        assert_eq!(frame.wire_size(), buf.len());
    }

    #[test]
    fn test_empty_body_and_max_class() {
        let buf = encoded(b"", u32::MAX, DataType::String, false);
        assert_eq!(buf.len(), HEADER_SIZE + FOOTER_SIZE);

        let header = FrameHeader::parse(&buf[..HEADER_SIZE], &FrameConfig::default()).unwrap();
        assert_eq!(header.message_class, u32::MAX);
        assert_eq!(header.body_len, 0);
        check_footer(&buf[HEADER_SIZE..]).unwrap();
    }

    #[test]
    fn test_invalid_marker() {
        let mut buf = encoded(b"x", 1, DataType::Binary, false);
        buf[0] = b'X';

        let result = FrameHeader::parse(&buf[..HEADER_SIZE], &FrameConfig::default());
        assert!(matches!(result, Err(FrameError::InvalidHeader)));
    }

    #[test]
    fn test_version_checked_from_prefix_alone() {
        let mut buf = BytesMut::new();
        buf.put_slice(BEGIN_MARKER);
        buf.put_u32(7);

        let result = check_prefix(&buf, &FrameConfig::default());
        assert!(matches!(
            result,
            Err(FrameError::IncompatibleVersion {
                expected: PROTOCOL_VERSION,
                found: 7
            })
        ));
    }

    #[test]
    fn test_invalid_footer() {
        let mut buf = encoded(b"abc", 1, DataType::Binary, false);
        let last = buf.len() - 1;
        buf[last] = b'X';

        assert!(matches!(
            check_footer(&buf[HEADER_SIZE + 3..]),
            Err(FrameError::InvalidFooter)
        ));
    }

    #[test]
    fn test_invalid_compressed_flag() {
        let mut buf = encoded(b"abc", 1, DataType::Binary, false);
        buf[23] = 2;

        let result = FrameHeader::parse(&buf[..HEADER_SIZE], &FrameConfig::default());
        assert!(matches!(result, Err(FrameError::InvalidCompressedFlag(2))));
    }

    #[test]
    fn test_unknown_data_type_passes_through() {
        let mut buf = encoded(b"abc", 1, DataType::Binary, false);
        buf[24] = 9;

        let header = FrameHeader::parse(&buf[..HEADER_SIZE], &FrameConfig::default()).unwrap();
        assert_eq!(header.data_type, Some(9));
    }

    #[test]
    fn test_body_length_limit() {
        let buf = encoded(&[0u8; 64], 1, DataType::Binary, false);
        let config = FrameConfig {
            max_body_size: 16,
            ..FrameConfig::default()
        };

        let header = FrameHeader::parse(&buf[..HEADER_SIZE], &config).unwrap();
        assert!(matches!(
            header.checked_body_len(&config),
            Err(FrameError::PayloadTooLarge { size: 64, max: 16 })
        ));
    }

    #[test]
    fn test_legacy_header_needs_opt_in() {
        let mut buf = BytesMut::new();
        encode_legacy_frame(b"old", false, &mut buf).unwrap();
        let legacy_header = &buf[..LEGACY_HEADER_SIZE];

        assert!(matches!(
            FrameHeader::parse(legacy_header, &FrameConfig::default()),
            Err(FrameError::IncompatibleVersion { found: 1, .. })
        ));

        let config = FrameConfig {
            accept_legacy: true,
            ..FrameConfig::default()
        };
        let header = FrameHeader::parse(legacy_header, &config).unwrap();
        let frame = header.into_frame(Bytes::from_static(b"old"));
        assert!(frame.is_legacy());
        assert_eq!(frame.message_class, 0);
        assert_eq!(frame.data_type, None);
        assert_eq!(frame.wire_size(), LEGACY_HEADER_SIZE + 3 + FOOTER_SIZE);
    }

    #[test]
    fn test_header_parse_rejects_wrong_length() {
        let buf = encoded(b"", 1, DataType::Binary, false);

        let result = FrameHeader::parse(&buf[..HEADER_SIZE - 1], &FrameConfig::default());
        assert!(matches!(result, Err(FrameError::InvalidHeader)));

        let header = FrameHeader::parse(&buf[..HEADER_SIZE], &FrameConfig::default()).unwrap();
        assert_eq!(header.body_len, 0);
        assert_eq!(header.data_type, Some(1));
    }
}
