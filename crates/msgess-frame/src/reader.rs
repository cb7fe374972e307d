use msgess_transport::{receive_exact, Transport, TransportError};
use tracing::{debug, warn};

use crate::codec::{
    check_footer, check_prefix, header_size, Frame, FrameConfig, FrameHeader, FOOTER_SIZE,
    PREFIX_SIZE,
};
use crate::error::{FrameError, Result};

/// Read the next complete frame from a transport (blocking).
///
/// The begin marker and protocol version are checked before anything past
/// them is read, so an incompatible peer is rejected without trusting its
/// length field. Body and footer are read in full before the footer is checked.
///
/// Returns `Err(FrameError::PeerClosed)` if the peer closed the stream before
/// sending any byte of a new frame. A close at any later point is a
/// [`TransportError::ConnectionClosed`].
pub fn read_frame<T: Transport + ?Sized>(
    transport: &mut T,
    config: &FrameConfig,
) -> Result<Frame> {
    let result = read_frame_inner(transport, config);
    if let Err(err) = &result {
        if err.is_protocol() {
            warn!(error = %err, "rejected malformed frame");
        }
    }
    result
}

fn read_frame_inner<T: Transport + ?Sized>(
    transport: &mut T,
    config: &FrameConfig,
) -> Result<Frame> {
    let mut header = match receive_exact(transport, PREFIX_SIZE) {
        Ok(prefix) => prefix,
        Err(TransportError::ConnectionClosed { received: 0, .. }) => {
            return Err(FrameError::PeerClosed)
        }
        Err(err) => return Err(err.into()),
    };
    let version = check_prefix(&header, config)?;

    let rest = receive_exact(transport, header_size(version) - PREFIX_SIZE)?;
    header.extend_from_slice(&rest);
    let header = FrameHeader::parse(&header, config)?;
    let body_len = header.checked_body_len(config)?;

    let body = receive_exact(transport, body_len)?.freeze();
    let footer = receive_exact(transport, FOOTER_SIZE)?;
    check_footer(&footer)?;

    debug!(
        version = header.version,
        message_class = header.message_class,
        data_type = ?header.data_type,
        compressed = header.compressed,
        body_len,
        "received frame"
    );
    Ok(header.into_frame(body))
}
