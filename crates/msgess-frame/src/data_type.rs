//! Payload type tags carried in byte 24 of every canonical frame.

use std::fmt;

/// What the body of a frame decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    /// Opaque bytes.
    Binary = 1,
    /// UTF-8 text.
    String = 2,
    /// A serialized JSON array.
    JsonArray = 3,
    /// A serialized JSON object.
    JsonObject = 4,
}

impl DataType {
    /// The on-wire tag.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Human-readable name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            DataType::Binary => "binary",
            DataType::String => "string",
            DataType::JsonArray => "json-array",
            DataType::JsonObject => "json-object",
        }
    }
}

impl TryFrom<u8> for DataType {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(DataType::Binary),
            2 => Ok(DataType::String),
            3 => Ok(DataType::JsonArray),
            4 => Ok(DataType::JsonObject),
            other => Err(other),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
