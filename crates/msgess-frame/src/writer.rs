use bytes::BytesMut;
use msgess_transport::{Transport, TransportError};
use tracing::debug;

use crate::codec::{encode_frame, PROTOCOL_VERSION};
use crate::data_type::DataType;
use crate::error::Result;
use crate::legacy::{encode_legacy_frame, LEGACY_PROTOCOL_VERSION};

/// Encode a canonical frame into `buf` and send it (blocking).
///
/// `buf` is cleared first and reused as scratch space; the whole frame is
/// handed to the transport in one `send_all` call.
pub fn write_frame<T: Transport + ?Sized>(
    transport: &mut T,
    buf: &mut BytesMut,
    body: &[u8],
    message_class: u32,
    data_type: DataType,
    compressed: bool,
) -> Result<()> {
    buf.clear();
    encode_frame(body, message_class, data_type, compressed, buf)?;
    transport.send_all(buf).map_err(TransportError::Send)?;

    debug!(
        version = PROTOCOL_VERSION,
        message_class,
        data_type = data_type.name(),
        compressed,
        body_len = body.len(),
        "sent frame"
    );
    Ok(())
}

/// Encode a legacy (version 1) frame into `buf` and send it (blocking).
pub fn write_legacy_frame<T: Transport + ?Sized>(
    transport: &mut T,
    buf: &mut BytesMut,
    body: &[u8],
    compressed: bool,
) -> Result<()> {
    buf.clear();
    encode_legacy_frame(body, compressed, buf)?;
    transport.send_all(buf).map_err(TransportError::Send)?;

    debug!(
        version = LEGACY_PROTOCOL_VERSION,
        compressed,
        body_len = body.len(),
        "sent legacy frame"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, ErrorKind};

    use super::*;
    use crate::codec::{FrameConfig, HEADER_SIZE};
    use crate::error::FrameError;
    use crate::reader::read_frame;
    use msgess_transport::StreamTransport;

    type Memory = StreamTransport<Cursor<Vec<u8>>>;

    fn sink() -> Memory {
        StreamTransport::new(Cursor::new(Vec::new()))
    }

    /// Rewind what was written so it can be read back.
    fn replay(transport: Memory) -> Memory {
        StreamTransport::new(Cursor::new(transport.into_inner().into_inner()))
    }

    #[test]
    fn write_single_frame() {
        let mut transport = sink();
        let mut buf = BytesMut::new();

        write_frame(&mut transport, &mut buf, b"hello", 1, DataType::String, false).unwrap();

        let frame = read_frame(&mut replay(transport), &FrameConfig::default()).unwrap();
        assert_eq!(frame.message_class, 1);
        assert_eq!(frame.body.as_ref(), b"hello");
    }

    #[test]
    fn scratch_buffer_is_reused() {
        let mut transport = sink();
        let mut buf = BytesMut::new();

        write_frame(&mut transport, &mut buf, b"one", 1, DataType::Binary, false).unwrap();
        write_frame(&mut transport, &mut buf, b"two", 2, DataType::Binary, false).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE + 3 + 9);

        let mut wire = replay(transport);
        let config = FrameConfig::default();
        let f1 = read_frame(&mut wire, &config).unwrap();
        let f2 = read_frame(&mut wire, &config).unwrap();
        assert_eq!((f1.message_class, f1.body.as_ref()), (1, b"one".as_ref()));
        assert_eq!((f2.message_class, f2.body.as_ref()), (2, b"two".as_ref()));
    }

    #[test]
    fn legacy_writer_emits_version_one() {
        let mut transport = sink();
        let mut buf = BytesMut::new();

        write_legacy_frame(&mut transport, &mut buf, b"old", true).unwrap();

        let wire = transport.into_inner().into_inner();
        assert_eq!(&wire[11..15], &[0, 0, 0, 1]);
        assert_eq!(wire[19], 1);
    }

    #[test]
    fn send_failure_is_a_transport_error() {
        let mut transport = StreamTransport::new(ZeroWriter);
        let mut buf = BytesMut::new();

        let err = write_frame(&mut transport, &mut buf, b"x", 1, DataType::Binary, false)
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Send(ref io)) if io.kind() == ErrorKind::WriteZero
        ));
    }

    struct ZeroWriter;

    impl io::Read for ZeroWriter {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl io::Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
