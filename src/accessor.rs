//! Field accessor protocol
//!
//! Reads and writes one field of a message instance by descriptor, hiding how
//! the reflection library stores singular, repeated and map fields.

use std::borrow::Cow;

use prost_reflect::{DynamicMessage, FieldDescriptor, MapKey, Value as WireValue};

/// Get/set access to the fields of a message instance
pub trait FieldAccess {
    /// Whether a singular field is present. Repeated fields are present when non-empty.
    fn is_present(&self, field: &FieldDescriptor) -> bool;

    /// Number of stored elements of a repeated or map field
    fn element_count(&self, field: &FieldDescriptor) -> usize;

    /// The stored value; for repeated fields the whole list
    fn stored(&self, field: &FieldDescriptor) -> Cow<'_, WireValue>;

    /// Replace the value of a singular field
    fn assign(&mut self, field: &FieldDescriptor, value: WireValue);

    /// Append one element to a repeated field
    fn append(&mut self, field: &FieldDescriptor, value: WireValue);

    /// Insert one entry into a map field
    fn insert_entry(&mut self, field: &FieldDescriptor, key: MapKey, value: WireValue);
}

impl FieldAccess for DynamicMessage {
    fn is_present(&self, field: &FieldDescriptor) -> bool {
        self.has_field(field)
    }

    fn element_count(&self, field: &FieldDescriptor) -> usize {
        if !self.has_field(field) {
            return 0;
        }
        match &*self.get_field(field) {
            WireValue::List(items) => items.len(),
            WireValue::Map(entries) => entries.len(),
            _ => 1,
        }
    }

    fn stored(&self, field: &FieldDescriptor) -> Cow<'_, WireValue> {
        self.get_field(field)
    }

    fn assign(&mut self, field: &FieldDescriptor, value: WireValue) {
        self.set_field(field, value);
    }

    fn append(&mut self, field: &FieldDescriptor, value: WireValue) {
        match self.get_field_mut(field) {
            WireValue::List(items) => items.push(value),
            slot => *slot = WireValue::List(vec![value]),
        }
    }

    fn insert_entry(&mut self, field: &FieldDescriptor, key: MapKey, value: WireValue) {
        match self.get_field_mut(field) {
            WireValue::Map(entries) => {
                entries.insert(key, value);
            }
            slot => *slot = WireValue::Map([(key, value)].into_iter().collect()),
        }
    }
}
