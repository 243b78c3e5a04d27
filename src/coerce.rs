//! Scalar coercion rules
//!
//! Maps a single wire-level scalar to a record [`Value`] and back. 64-bit
//! integers cross the boundary as decimal text so that values beyond 2^53
//! survive the trip through a record's `f64` numbers.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use prost_reflect::{FieldDescriptor, Kind, Value as WireValue};
use tracing::debug;

use crate::config::{BytesText, MarshalOptions};
use crate::error::{MarshalError, Result};
use crate::value::Value;

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Convert a stored scalar to its record representation.
///
/// Message values are handled by the owning marshaler and map to `Null` here.
pub fn decode_scalar(value: &WireValue, field: &FieldDescriptor) -> Value {
    match value {
        WireValue::Bool(b) => Value::Bool(*b),
        WireValue::I32(n) => Value::Number(*n as f64),
        WireValue::U32(n) => Value::Number(*n as f64),
        WireValue::I64(n) => Value::String(n.to_string()),
        WireValue::U64(n) => Value::String(n.to_string()),
        WireValue::F32(n) => Value::Number(*n as f64),
        WireValue::F64(n) => Value::Number(*n),
        WireValue::String(s) => Value::String(s.clone()),
        WireValue::Bytes(b) => Value::Bytes(b.clone()),
        WireValue::EnumNumber(number) => decode_enum(*number, field),
        WireValue::Message(_) | WireValue::List(_) | WireValue::Map(_) => Value::Null,
    }
}

// Open enums may carry numbers the schema does not name; those stay numeric.
fn decode_enum(number: i32, field: &FieldDescriptor) -> Value {
    match field.kind() {
        Kind::Enum(descriptor) => match descriptor.get_value(number) {
            Some(symbol) => Value::String(symbol.name().to_string()),
            None => Value::Number(number as f64),
        },
        _ => Value::Number(number as f64),
    }
}

/// Convert one record value into the scalar stored for `field`.
pub fn encode_scalar(
    value: &Value,
    field: &FieldDescriptor,
    options: &MarshalOptions,
) -> Result<WireValue> {
    let encoded = match field.kind() {
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => WireValue::I32(to_int32(to_number(value))),
        Kind::Uint32 | Kind::Fixed32 => WireValue::U32(to_uint32(to_number(value))),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => WireValue::I64(to_int64(value, field)?),
        Kind::Uint64 | Kind::Fixed64 => WireValue::U64(to_uint64(value, field)?),
        Kind::Float => WireValue::F32(to_number(value) as f32),
        Kind::Double => WireValue::F64(to_number(value)),
        Kind::Bool => WireValue::Bool(is_truthy(value)),
        Kind::String => WireValue::String(to_text(value)),
        Kind::Bytes => WireValue::Bytes(to_bytes(value, field, options.bytes_text)?),
        Kind::Enum(descriptor) => {
            let symbol = match value {
                Value::Number(n) => descriptor.get_value(to_int32(*n)),
                other => descriptor.get_value_by_name(&to_text(other)),
            };
            match symbol {
                Some(symbol) => WireValue::EnumNumber(symbol.number()),
                None => {
                    return Err(MarshalError::UnknownEnumValue {
                        field: field.full_name().to_string(),
                        value: value.to_string(),
                    })
                }
            }
        }
        // Nested messages are converted by the marshaler that owns the field.
        Kind::Message(_) => {
            return Err(MarshalError::NotAnObject {
                field: field.full_name().to_string(),
            })
        }
    };
    Ok(encoded)
}

/// Numeric reading of any record value. Unparseable input yields NaN.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => *n,
        Value::String(s) => parse_number(s),
        Value::Bytes(b) => std::str::from_utf8(b).map(parse_number).unwrap_or(f64::NAN),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Truncate to 32 bits, wrapping modulo 2^32. Non-finite input becomes 0.
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// Truncate to 32 unsigned bits, wrapping modulo 2^32. Non-finite input becomes 0.
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(TWO_POW_32) as u32
}

fn to_int64(value: &Value, field: &FieldDescriptor) -> Result<i64> {
    match value {
        Value::String(text) => text.trim().parse().map_err(|_| invalid_integer(text, field)),
        // saturating; NaN maps to 0
        other => Ok(to_number(other) as i64),
    }
}

fn to_uint64(value: &Value, field: &FieldDescriptor) -> Result<u64> {
    match value {
        Value::String(text) => text.trim().parse().map_err(|_| invalid_integer(text, field)),
        other => Ok(to_number(other) as u64),
    }
}

fn invalid_integer(text: &str, field: &FieldDescriptor) -> MarshalError {
    MarshalError::InvalidInteger {
        field: field.full_name().to_string(),
        value: text.to_string(),
    }
}

/// Truthiness: null, false, zero, NaN and empty text are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Bytes(_) | Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of a value written to a `string` field.
///
/// Byte buffers are taken as raw text. String storage is UTF-8, so sequences
/// that are not UTF-8 become U+FFFD. Arrays and objects are rendered as their
/// JSON text (`["a","b"]`), not joined with commas.
fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bytes(b) => match std::str::from_utf8(b) {
            Ok(text) => text.to_string(),
            Err(e) => {
                debug!(
                    valid_up_to = e.valid_up_to(),
                    len = b.len(),
                    "replacing invalid UTF-8 in text value"
                );
                String::from_utf8_lossy(b).into_owned()
            }
        },
        other => other.to_string(),
    }
}

fn to_bytes(value: &Value, field: &FieldDescriptor, text: BytesText) -> Result<Bytes> {
    match (value, text) {
        (Value::Bytes(b), _) => Ok(b.clone()),
        (Value::String(s), BytesText::Base64) => BASE64
            .decode(s.trim())
            .map(Bytes::from)
            .map_err(|_| MarshalError::InvalidBase64 {
                field: field.full_name().to_string(),
            }),
        (other, _) => Ok(Bytes::from(to_text(other).into_bytes())),
    }
}
