use bytes::BytesMut;
use msgess_frame::compression::{compress, decompress_bounded, level_to_compression};
use msgess_frame::{read_frame, write_frame, write_legacy_frame, DataType, Frame};
use msgess_transport::{Transport, TransportError};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{CompressionSettings, ExchangeConfig, Protocol};
use crate::error::{ExchangeError, Result};
use crate::incoming::Incoming;
use crate::json::{self, Shape};
use crate::payload::{JsonArray, JsonObject, Payload};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Sends and receives typed messages over one transport.
///
/// Every call blocks until a whole frame has been sent or received. The
/// exchange owns its transport; it must not be driven from two threads at
/// once without external locking, since interleaved reads would corrupt
/// framing.
///
/// After any failed receive the stream position is unknown and the exchange
/// should be closed.
pub struct MessageExchange<T> {
    transport: T,
    config: ExchangeConfig,
    buf: BytesMut,
}

impl<T: Transport> MessageExchange<T> {
    /// Wrap a transport with default configuration (compression on, level -1).
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ExchangeConfig::default())
    }

    /// Wrap a transport with explicit configuration.
    pub fn with_config(transport: T, config: ExchangeConfig) -> Self {
        Self {
            transport,
            config,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Send raw bytes tagged as binary.
    pub fn send_binary(&mut self, data: &[u8], message_class: u32) -> Result<()> {
        self.send_body(data, message_class, DataType::Binary)
    }

    /// Receive a binary message and its class.
    pub fn receive_binary(&mut self) -> Result<(Vec<u8>, u32)> {
        self.receive()
    }

    /// Send UTF-8 text.
    pub fn send_string(&mut self, text: &str, message_class: u32) -> Result<()> {
        self.send_body(text.as_bytes(), message_class, DataType::String)
    }

    /// Receive a text message and its class. Invalid UTF-8 is an error.
    pub fn receive_string(&mut self) -> Result<(String, u32)> {
        self.receive()
    }

    /// Send a value that must serialize to a JSON array.
    ///
    /// Anything else is rejected before a byte is written.
    pub fn send_json_array<V: Serialize + ?Sized>(
        &mut self,
        value: &V,
        message_class: u32,
    ) -> Result<()> {
        let body = json::encode(value, Shape::Array)?;
        self.send_body(&body, message_class, DataType::JsonArray)
    }

    /// Receive a JSON array message and its class.
    pub fn receive_json_array(&mut self) -> Result<(JsonArray, u32)> {
        self.receive()
    }

    /// Send a value that must serialize to a JSON object.
    ///
    /// Anything else is rejected before a byte is written.
    pub fn send_json_object<V: Serialize + ?Sized>(
        &mut self,
        value: &V,
        message_class: u32,
    ) -> Result<()> {
        let body = json::encode(value, Shape::Object)?;
        self.send_body(&body, message_class, DataType::JsonObject)
    }

    /// Receive a JSON object message and its class.
    pub fn receive_json_object(&mut self) -> Result<(JsonObject, u32)> {
        self.receive()
    }

    /// Iterate over incoming binary messages until the peer closes.
    pub fn incoming_binary(&mut self) -> Incoming<'_, T, Vec<u8>> {
        Incoming::new(self)
    }

    /// Iterate over incoming text messages until the peer closes.
    pub fn incoming_strings(&mut self) -> Incoming<'_, T, String> {
        Incoming::new(self)
    }

    /// Iterate over incoming JSON array messages until the peer closes.
    pub fn incoming_json_arrays(&mut self) -> Incoming<'_, T, JsonArray> {
        Incoming::new(self)
    }

    /// Iterate over incoming JSON object messages until the peer closes.
    pub fn incoming_json_objects(&mut self) -> Incoming<'_, T, JsonObject> {
        Incoming::new(self)
    }

    /// Turn compression of outgoing messages on or off.
    ///
    /// `level` of `None` keeps the current level. An invalid level leaves the
    /// settings untouched. Messages already sent are not affected.
    pub fn set_compression(&mut self, enabled: bool, level: Option<i32>) -> Result<()> {
        if let Some(level) = level {
            level_to_compression(level)?;
            self.config.compression.level = level;
        }
        self.config.compression.enabled = enabled;
        debug!(
            enabled,
            level = self.config.compression.level,
            "updated compression settings"
        );
        Ok(())
    }

    /// Current compression settings.
    pub fn compression(&self) -> CompressionSettings {
        self.config.compression
    }

    /// Current configuration.
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Close the underlying transport.
    pub fn close(mut self) -> Result<()> {
        debug!("closing message exchange");
        self.transport
            .close()
            .map_err(|err| ExchangeError::Close(TransportError::Close(err)))
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    ///
    /// Reading from or writing to it directly will desynchronize framing.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the exchange and return the transport without closing it.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Receive one message and decode it as `P`.
    pub(crate) fn receive<P: Payload>(&mut self) -> Result<(P, u32)> {
        let frame = read_frame(&mut self.transport, &self.config.frame)?;
        check_data_type(&frame, P::DATA_TYPE)?;

        let message_class = frame.message_class;
        let body = if frame.compressed {
            decompress_bounded(&frame.body, self.config.frame.max_body_size)?
        } else {
            frame.body.to_vec()
        };

        Ok((P::decode(body)?, message_class))
    }

    fn send_body(&mut self, payload: &[u8], message_class: u32, data_type: DataType) -> Result<()> {
        let settings = self.config.compression;
        let compressed;
        let body: &[u8] = if settings.enabled {
            compressed = compress(payload, settings.level)?;
            &compressed
        } else {
            payload
        };

        match self.config.send_protocol {
            Protocol::Canonical => write_frame(
                &mut self.transport,
                &mut self.buf,
                body,
                message_class,
                data_type,
                settings.enabled,
            )?,
            Protocol::Legacy => write_legacy_frame(
                &mut self.transport,
                &mut self.buf,
                body,
                settings.enabled,
            )?,
        }
        Ok(())
    }
}

fn check_data_type(frame: &Frame, expected: DataType) -> Result<()> {
    match frame.data_type {
        // Legacy frames carry no tag to compare against.
        None => Ok(()),
        Some(found) if found == expected.tag() => Ok(()),
        Some(found) => {
            warn!(
                expected = expected.name(),
                found,
                message_class = frame.message_class,
                "rejected frame with unexpected data type"
            );
            Err(ExchangeError::UnexpectedDataType { expected, found })
        }
    }
}

impl<T> std::fmt::Debug for MessageExchange<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageExchange")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
