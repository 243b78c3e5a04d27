//! Type Marshaler
//!
//! Converts message instances of one type to records and back. Nested message
//! fields recurse through the marshaler the registry holds for the child type.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use prost_reflect::{DynamicMessage, FieldDescriptor, Kind, MapKey, MessageDescriptor, Value as WireValue};

use crate::accessor::FieldAccess;
use crate::coerce;
use crate::config::MarshalOptions;
use crate::error::{MarshalError, Result};
use crate::layout::FieldLayout;
use crate::registry::SchemaRegistry;
use crate::value::{Record, Value};

/// Compiled conversion strategy for one message type
#[derive(Debug)]
pub struct TypeMarshaler {
    descriptor: MessageDescriptor,
    layout: FieldLayout,
}

impl TypeMarshaler {
    /// Compile the marshaler for `descriptor`
    pub fn new(descriptor: MessageDescriptor, options: MarshalOptions) -> Self {
        let layout = FieldLayout::compile(&descriptor, options.field_names);
        Self { descriptor, layout }
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    pub fn full_name(&self) -> &str {
        self.descriptor.full_name()
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    /// Decode an instance into a record. Unset fields are left out.
    pub fn to_record(&self, registry: &SchemaRegistry, instance: &DynamicMessage) -> Record {
        let mut positional = Vec::with_capacity(self.layout.len());

        for slot in self.layout.slots() {
            let field = &slot.field;
            let present = if field.is_list() || field.is_map() {
                instance.element_count(field) > 0
            } else {
                instance.is_present(field)
            };
            if !present {
                positional.push(None);
                continue;
            }

            let child = child_marshaler(registry, field);
            let value = match &*instance.stored(field) {
                WireValue::List(items) => Value::Array(
                    items
                        .iter()
                        .map(|item| element_to_record(registry, field, child.as_deref(), item))
                        .collect(),
                ),
                WireValue::Map(entries) => match child.as_deref() {
                    Some(entry) => map_to_record(registry, entry, entries),
                    None => Value::Null,
                },
                single => element_to_record(registry, field, child.as_deref(), single),
            };
            positional.push(Some(value));
        }

        self.layout.unflatten(positional)
    }

    /// Build a fresh instance from a record, stopping at the first conversion error.
    pub fn to_message(&self, registry: &SchemaRegistry, record: &Record) -> Result<DynamicMessage> {
        let mut instance = DynamicMessage::new(self.descriptor.clone());

        for (slot, value) in self.layout.slots().iter().zip(self.layout.flatten(record)) {
            let Some(value) = value else { continue };
            let field = &slot.field;
            let child = child_marshaler(registry, field);

            if field.is_map() {
                let Some(entry) = child.as_deref() else { continue };
                let Value::Array(items) = value else {
                    return Err(not_an_array(field));
                };
                for item in items {
                    let (key, stored) = entry_to_wire(registry, entry, field, item)?;
                    instance.insert_entry(field, key, stored);
                }
            } else if field.is_list() {
                let Value::Array(items) = value else {
                    return Err(not_an_array(field));
                };
                for item in items {
                    let stored = element_to_wire(registry, field, child.as_deref(), item)?;
                    instance.append(field, stored);
                }
            } else {
                let stored = element_to_wire(registry, field, child.as_deref(), value)?;
                instance.assign(field, stored);
            }
        }

        Ok(instance)
    }
}

fn child_marshaler(registry: &SchemaRegistry, field: &FieldDescriptor) -> Option<Rc<TypeMarshaler>> {
    match field.kind() {
        Kind::Message(descriptor) => Some(registry.marshaler_for(&descriptor)),
        _ => None,
    }
}

fn element_to_record(
    registry: &SchemaRegistry,
    field: &FieldDescriptor,
    child: Option<&TypeMarshaler>,
    value: &WireValue,
) -> Value {
    match (value, child) {
        (WireValue::Message(message), Some(child)) => Value::Object(child.to_record(registry, message)),
        (other, _) => coerce::decode_scalar(other, field),
    }
}

fn element_to_wire(
    registry: &SchemaRegistry,
    field: &FieldDescriptor,
    child: Option<&TypeMarshaler>,
    value: &Value,
) -> Result<WireValue> {
    match child {
        Some(child) => {
            let Value::Object(record) = value else {
                return Err(MarshalError::NotAnObject {
                    field: field.full_name().to_string(),
                });
            };
            Ok(WireValue::Message(child.to_message(registry, record)?))
        }
        None => coerce::encode_scalar(value, field, registry.options()),
    }
}

// Map fields travel as a sequence of `{key, value}` entry records, ordered by key.
fn map_to_record(
    registry: &SchemaRegistry,
    entry: &TypeMarshaler,
    entries: &HashMap<MapKey, WireValue>,
) -> Value {
    let descriptor = entry.descriptor();
    let key_field = descriptor.map_entry_key_field();
    let value_field = descriptor.map_entry_value_field();
    let value_child = child_marshaler(registry, &value_field);

    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by(|(a, _), (b, _)| compare_keys(a, b));

    let layout = entry.layout();
    let items = sorted
        .into_iter()
        .map(|(key, value)| {
            let mut positional = vec![None; layout.len()];
            if let Some(at) = layout.position(&key_field) {
                positional[at] = Some(coerce::decode_scalar(&key_to_wire(key), &key_field));
            }
            if let Some(at) = layout.position(&value_field) {
                positional[at] = Some(element_to_record(
                    registry,
                    &value_field,
                    value_child.as_deref(),
                    value,
                ));
            }
            Value::Object(layout.unflatten(positional))
        })
        .collect();
    Value::Array(items)
}

fn entry_to_wire(
    registry: &SchemaRegistry,
    entry: &TypeMarshaler,
    field: &FieldDescriptor,
    item: &Value,
) -> Result<(MapKey, WireValue)> {
    let Value::Object(record) = item else {
        return Err(MarshalError::NotAnObject {
            field: field.full_name().to_string(),
        });
    };
    let descriptor = entry.descriptor();
    let key_field = descriptor.map_entry_key_field();
    let value_field = descriptor.map_entry_value_field();
    let layout = entry.layout();
    let positional = layout.flatten(record);
    let lookup = |target: &FieldDescriptor| layout.position(target).and_then(|at| positional[at]);

    let key = match lookup(&key_field) {
        Some(value) => coerce::encode_scalar(value, &key_field, registry.options())?,
        None => WireValue::default_value_for_field(&key_field),
    };
    let value = match lookup(&value_field) {
        Some(value) => {
            let value_child = child_marshaler(registry, &value_field);
            element_to_wire(registry, &value_field, value_child.as_deref(), value)?
        }
        None => WireValue::default_value_for_field(&value_field),
    };

    let key = wire_to_key(key).ok_or_else(|| MarshalError::NotAnObject {
        field: field.full_name().to_string(),
    })?;
    Ok((key, value))
}

fn key_to_wire(key: &MapKey) -> WireValue {
    match key {
        MapKey::Bool(b) => WireValue::Bool(*b),
        MapKey::I32(n) => WireValue::I32(*n),
        MapKey::I64(n) => WireValue::I64(*n),
        MapKey::U32(n) => WireValue::U32(*n),
        MapKey::U64(n) => WireValue::U64(*n),
        MapKey::String(s) => WireValue::String(s.clone()),
    }
}

fn wire_to_key(value: WireValue) -> Option<MapKey> {
    match value {
        WireValue::Bool(b) => Some(MapKey::Bool(b)),
        WireValue::I32(n) => Some(MapKey::I32(n)),
        WireValue::I64(n) => Some(MapKey::I64(n)),
        WireValue::U32(n) => Some(MapKey::U32(n)),
        WireValue::U64(n) => Some(MapKey::U64(n)),
        WireValue::String(s) => Some(MapKey::String(s)),
        _ => None,
    }
}

// All keys of one map share a variant.
fn compare_keys(a: &MapKey, b: &MapKey) -> Ordering {
    match (a, b) {
        (MapKey::Bool(a), MapKey::Bool(b)) => a.cmp(b),
        (MapKey::I32(a), MapKey::I32(b)) => a.cmp(b),
        (MapKey::I64(a), MapKey::I64(b)) => a.cmp(b),
        (MapKey::U32(a), MapKey::U32(b)) => a.cmp(b),
        (MapKey::U64(a), MapKey::U64(b)) => a.cmp(b),
        (MapKey::String(a), MapKey::String(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn not_an_array(field: &FieldDescriptor) -> MarshalError {
    MarshalError::NotAnArray {
        field: field.full_name().to_string(),
    }
}
