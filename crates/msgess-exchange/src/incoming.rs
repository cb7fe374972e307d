use std::iter::FusedIterator;
use std::marker::PhantomData;

use msgess_transport::Transport;
use tracing::debug;

use crate::error::Result;
use crate::exchange::MessageExchange;
use crate::payload::Payload;

/// Blocking iterator over incoming messages of one payload type.
///
/// Yields `(payload, message_class)` pairs. Ends when the peer closes the
/// stream cleanly between frames. After the first error it yields that error
/// once and then ends.
///
/// Created by the `incoming_*` methods on [`MessageExchange`].
pub struct Incoming<'a, T, P> {
    exchange: &'a mut MessageExchange<T>,
    done: bool,
    _payload: PhantomData<fn() -> P>,
}

impl<'a, T: Transport, P: Payload> Incoming<'a, T, P> {
    pub(crate) fn new(exchange: &'a mut MessageExchange<T>) -> Self {
        Self {
            exchange,
            done: false,
            _payload: PhantomData,
        }
    }
}

impl<T: Transport, P: Payload> Iterator for Incoming<'_, T, P> {
    type Item = Result<(P, u32)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.exchange.receive::<P>() {
            Ok(message) => Some(Ok(message)),
            Err(err) if err.is_peer_closed() => {
                debug!("peer closed; no more incoming messages");
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<T: Transport, P: Payload> FusedIterator for Incoming<'_, T, P> {}
