use msgess_frame::compression::level_to_compression;
use msgess_frame::{FrameConfig, DEFAULT_COMPRESSION_LEVEL};

use crate::error::Result;

/// Compression applied to outgoing bodies.
///
/// Only affects sends. Incoming frames say for themselves whether they are
/// compressed, so both ends may use different settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    /// Compress bodies before framing. Default: true.
    pub enabled: bool,
    /// Level in `-1..=9`; -1 selects the library default. Default: -1.
    pub level: i32,
}

impl CompressionSettings {
    /// Settings with compression turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Enabled settings at a validated level.
    pub fn with_level(level: i32) -> Result<Self> {
        level_to_compression(level)?;
        Ok(Self {
            enabled: true,
            level,
        })
    }
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

/// Frame layout used for outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Version 2: message class and data type in every header.
    #[default]
    Canonical,
    /// Deprecated version 1 layout, without class or type. Only for peers
    /// that cannot speak version 2.
    Legacy,
}

/// Configuration for a [`MessageExchange`](crate::MessageExchange).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExchangeConfig {
    /// Compression for outgoing bodies.
    pub compression: CompressionSettings,
    /// Layout for outgoing frames.
    pub send_protocol: Protocol,
    /// Decoder limits and accepted versions for incoming frames.
    pub frame: FrameConfig,
}
