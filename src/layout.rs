//! Compiled field order
//!
//! A [`FieldLayout`] fixes the declaration order of a message's fields once and
//! moves values between a [`Record`] and a positional sequence in that order, so
//! conversions never search the record by name field-by-field.

use prost_reflect::{FieldDescriptor, MessageDescriptor};

use crate::config::FieldNaming;
use crate::value::{Record, Value};

/// One field of the layout
#[derive(Debug, Clone)]
pub struct FieldSlot {
    /// Record property name
    pub name: String,
    pub field: FieldDescriptor,
}

/// Field-order table for one message type
#[derive(Debug, Clone)]
pub struct FieldLayout {
    slots: Vec<FieldSlot>,
}

impl FieldLayout {
    /// Compile the layout for `descriptor` in declaration order
    pub fn compile(descriptor: &MessageDescriptor, naming: FieldNaming) -> Self {
        let slots = descriptor
            .fields()
            .map(|field| {
                let name = match naming {
                    FieldNaming::Json => field.json_name().to_string(),
                    FieldNaming::Proto => field.name().to_string(),
                };
                FieldSlot { name, field }
            })
            .collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Property names in positional order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.slots.iter().map(|slot| slot.name.as_str())
    }

    /// Position of a field, matched by field number
    pub fn position(&self, field: &FieldDescriptor) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.field.number() == field.number())
    }

    /// Record to positional form. Missing and null properties become `None`.
    pub fn flatten<'r>(&self, record: &'r Record) -> Vec<Option<&'r Value>> {
        self.slots
            .iter()
            .map(|slot| record.get(&slot.name).filter(|value| !value.is_null()))
            .collect()
    }

    /// Positional form to record. `None` entries are left out.
    pub fn unflatten(&self, values: Vec<Option<Value>>) -> Record {
        self.slots
            .iter()
            .zip(values)
            .filter_map(|(slot, value)| value.map(|value| (slot.name.clone(), value)))
            .collect()
    }
}
