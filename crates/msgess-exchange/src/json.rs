//! JSON body encoding.
//!
//! Bodies are written with `", "` and `": "` separators and with every
//! non-ASCII character escaped as `\uXXXX`, the layout other MsgESS
//! implementations produce for strings and containers. Non-finite floats have
//! no JSON form and are rejected instead of being written as `null`.

use std::io;

use serde::ser::{self, Serialize, Serializer};
use serde_json::ser::Formatter;
use serde_json::{Map, Value};

use crate::error::{ExchangeError, Result};

/// Top-level shape a JSON message must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Array,
    Object,
}

impl Shape {
    fn name(self) -> &'static str {
        match self {
            Shape::Array => "array",
            Shape::Object => "object",
        }
    }

    fn check(self, value: &Value) -> Result<()> {
        let matches = match self {
            Shape::Array => value.is_array(),
            Shape::Object => value.is_object(),
        };
        if !matches {
            return Err(self.mismatch(value));
        }
        Ok(())
    }

    fn mismatch(self, found: &Value) -> ExchangeError {
        ExchangeError::JsonShape {
            expected: self.name(),
            found: kind_name(found),
        }
    }
}

/// Serialize `value`, rejecting it unless its top level has `shape`.
pub(crate) fn encode<T: Serialize + ?Sized>(value: &T, shape: Shape) -> Result<Vec<u8>> {
    // `to_value` silently maps NaN and infinities to null.
    value.serialize(FiniteFloats)?;
    let value = serde_json::to_value(value)?;
    shape.check(&value)?;

    let mut out = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

/// Parse a body whose top level must be an array.
pub(crate) fn decode_array(text: &str) -> Result<Vec<Value>> {
    match serde_json::from_str(text)? {
        Value::Array(items) => Ok(items),
        other => Err(Shape::Array.mismatch(&other)),
    }
}

/// Parse a body whose top level must be an object.
pub(crate) fn decode_object(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(text)? {
        Value::Object(map) => Ok(map),
        other => Err(Shape::Object.mismatch(&other)),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut plain = 0;
        for (at, c) in fragment.char_indices() {
            if c.is_ascii() {
                continue;
            }
            writer.write_all(fragment[plain..at].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            plain = at + c.len_utf8();
        }
        writer.write_all(fragment[plain..].as_bytes())
    }
}

fn finite(value: f64) -> std::result::Result<(), serde_json::Error> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ser::Error::custom(format_args!(
            "{value} cannot be represented in json"
        )))
    }
}

/// Walks a value without producing output, failing on NaN or infinity.
struct FiniteFloats;

type Walk = std::result::Result<(), serde_json::Error>;

impl Serializer for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _v: bool) -> Walk {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Walk {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Walk {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Walk {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Walk {
        Ok(())
    }

    fn serialize_i128(self, _v: i128) -> Walk {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Walk {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Walk {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Walk {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Walk {
        Ok(())
    }

    fn serialize_u128(self, _v: u128) -> Walk {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Walk {
        finite(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Walk {
        finite(v)
    }

    fn serialize_char(self, _v: char) -> Walk {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Walk {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Walk {
        Ok(())
    }

    fn serialize_none(self) -> Walk {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Walk {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Walk {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Walk {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Walk {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Walk {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Walk {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Walk {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Walk {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Walk {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Walk {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Walk {
        key.serialize(FiniteFloats)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Walk {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _key: &'static str, value: &T) -> Walk {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _key: &'static str, value: &T) -> Walk {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}
