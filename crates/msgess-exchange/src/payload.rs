//! Payload types a message can be received as.
//!
//! Each payload type is bound to exactly one data type tag. The binding is
//! fixed here; callers pick a payload type, never a tag.

use msgess_frame::DataType;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::json;

/// A JSON array message.
pub type JsonArray = Vec<Value>;

/// A JSON object message.
pub type JsonObject = Map<String, Value>;

mod sealed {
    pub trait Sealed {}

    impl Sealed for Vec<u8> {}
    impl Sealed for String {}
    impl Sealed for super::JsonArray {}
    impl Sealed for super::JsonObject {}
}

/// A value decodable from a message body.
///
/// Implemented for `Vec<u8>` (binary), `String`, [`JsonArray`] and
/// [`JsonObject`]. This trait is sealed.
pub trait Payload: sealed::Sealed + Sized {
    /// Tag an incoming frame must carry to decode as this type.
    const DATA_TYPE: DataType;

    #[doc(hidden)]
    fn decode(body: Vec<u8>) -> Result<Self>;
}

impl Payload for Vec<u8> {
    const DATA_TYPE: DataType = DataType::Binary;

    fn decode(body: Vec<u8>) -> Result<Self> {
        Ok(body)
    }
}

impl Payload for String {
    const DATA_TYPE: DataType = DataType::String;

    fn decode(body: Vec<u8>) -> Result<Self> {
        Ok(String::from_utf8(body)?)
    }
}

impl Payload for JsonArray {
    const DATA_TYPE: DataType = DataType::JsonArray;

    fn decode(body: Vec<u8>) -> Result<Self> {
        json::decode_array(&String::from_utf8(body)?)
    }
}

impl Payload for JsonObject {
    const DATA_TYPE: DataType = DataType::JsonObject;

    fn decode(body: Vec<u8>) -> Result<Self> {
        json::decode_object(&String::from_utf8(body)?)
    }
}
