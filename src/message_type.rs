//! Marshaling facade
//!
//! A [`MessageType`] is what callers get back from
//! [`SchemaRegistry::resolve`](crate::SchemaRegistry::resolve): a type bound to
//! its cached marshaler, exposing `parse` and `serialize`.

use std::rc::Rc;

use bytes::Bytes;
use prost::Message;
use prost_reflect::{Cardinality, DynamicMessage, MessageDescriptor, ReflectMessage, Value as WireValue};
use tracing::debug;

use crate::error::{MarshalError, Result};
use crate::marshaler::TypeMarshaler;
use crate::registry::SchemaRegistry;
use crate::value::{Record, Value};

/// A resolved message type
#[derive(Debug, Clone)]
pub struct MessageType<'r> {
    registry: &'r SchemaRegistry,
    marshaler: Rc<TypeMarshaler>,
}

impl<'r> MessageType<'r> {
    pub(crate) fn new(registry: &'r SchemaRegistry, marshaler: Rc<TypeMarshaler>) -> Self {
        Self { registry, marshaler }
    }

    /// Fully-qualified type name
    pub fn full_name(&self) -> &str {
        self.marshaler.full_name()
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        self.marshaler.descriptor()
    }

    /// The cached marshaler backing this type
    pub fn marshaler(&self) -> &Rc<TypeMarshaler> {
        &self.marshaler
    }

    /// Decode wire bytes into a record
    pub fn parse(&self, bytes: &[u8]) -> Result<Record> {
        let instance = DynamicMessage::decode(self.descriptor().clone(), bytes).map_err(|e| {
            debug!(type_name = self.full_name(), error = %e, "parse failed");
            MarshalError::MalformedMessage(e.to_string())
        })?;
        if let Some(field) = missing_required(&instance) {
            debug!(type_name = self.full_name(), field = %field, "parse failed");
            return Err(MarshalError::MalformedMessage(format!(
                "missing required field {}",
                field
            )));
        }
        Ok(self.marshaler.to_record(self.registry, &instance))
    }

    /// Encode a record value into wire bytes.
    ///
    /// The value must be an object; nothing is produced when any field fails
    /// to convert.
    pub fn serialize(&self, value: &Value) -> Result<Bytes> {
        match value {
            Value::Object(record) => self.serialize_record(record),
            _ => Err(MarshalError::NotAnObject {
                field: self.full_name().to_string(),
            }),
        }
    }

    /// Encode a record into wire bytes
    pub fn serialize_record(&self, record: &Record) -> Result<Bytes> {
        let instance = self
            .marshaler
            .to_message(self.registry, record)
            .inspect_err(|e| debug!(type_name = self.full_name(), error = %e, "serialize failed"))?;

        let mut buf = Vec::with_capacity(instance.encoded_len());
        instance.encode(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

/// First `required` field left unset, searching nested messages depth-first
fn missing_required(instance: &DynamicMessage) -> Option<String> {
    for field in instance.descriptor().fields() {
        let present = instance.has_field(&field);
        if field.cardinality() == Cardinality::Required && !present {
            return Some(field.full_name().to_string());
        }
        if !present || field.kind().as_message().is_none() {
            continue;
        }

        let missing = match &*instance.get_field(&field) {
            WireValue::Message(child) => missing_required(child),
            WireValue::List(items) => items
                .iter()
                .filter_map(WireValue::as_message)
                .find_map(missing_required),
            WireValue::Map(entries) => entries
                .values()
                .filter_map(WireValue::as_message)
                .find_map(missing_required),
            _ => None,
        };
        if missing.is_some() {
            return missing;
        }
    }
    None
}
