use bytes::BytesMut;
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Largest number of bytes requested from the transport in a single receive.
pub const MAX_RECEIVE_CHUNK: usize = 16 * 1024;

/// Receive exactly `n` bytes, looping over bounded receives.
///
/// A zero-length receive before `n` bytes have arrived means the peer closed
/// the stream mid-message and fails with [`TransportError::ConnectionClosed`].
/// Never returns a short buffer.
pub fn receive_exact<T: Transport + ?Sized>(transport: &mut T, n: usize) -> Result<BytesMut> {
    // `n` may come from the wire, so grow per chunk instead of trusting it up front.
    let mut data = BytesMut::with_capacity(n.min(MAX_RECEIVE_CHUNK));
    let mut chunk = [0u8; MAX_RECEIVE_CHUNK];

    while data.len() < n {
        let want = (n - data.len()).min(MAX_RECEIVE_CHUNK);
        let got = transport
            .receive(&mut chunk[..want])
            .map_err(TransportError::Receive)?;

        if got == 0 {
            return Err(TransportError::ConnectionClosed {
                expected: n,
                received: data.len(),
            });
        }
        if got > want {
            return Err(TransportError::LengthMismatch {
                expected: n,
                received: data.len() + got,
            });
        }

        trace!(got, remaining = n - data.len() - got, "received chunk");
        data.extend_from_slice(&chunk[..got]);
    }

    if data.len() != n {
        return Err(TransportError::LengthMismatch {
            expected: n,
            received: data.len(),
        });
    }

    Ok(data)
}
