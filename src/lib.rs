//! Schema Marshal
//!
//! Runtime schema-driven marshaling between protobuf wire bytes and generic,
//! dynamically-typed records. Message types are discovered from a descriptor
//! pool at runtime; no code generation is involved.
//!
//! ## Features
//!
//! - **Runtime schemas**: open a registry over the built-in types or over a
//!   serialized `FileDescriptorSet`
//! - **Compiled field order**: each message type gets one cached
//!   [`TypeMarshaler`] per registry
//! - **64-bit fidelity**: int64/uint64 values travel as decimal text
//! - **Bytes vs text**: `bytes` fields decode to raw buffers, `string` fields to text
//!
//! ## Data flow
//!
//! ```text
//! bytes ──decode──▶ DynamicMessage ──TypeMarshaler::to_record──▶ Record
//! Record ──TypeMarshaler::to_message──▶ DynamicMessage ──encode──▶ bytes
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use schema_marshal::{SchemaRegistry, Value};
//!
//! let descriptor_set = std::fs::read("descriptors.pb")?;
//! let registry = SchemaRegistry::open(Some(&descriptor_set))?;
//! let person = registry.resolve("example.Person").expect("type is in the set");
//!
//! let record = person.parse(&std::fs::read("person.bin")?)?;
//! let bytes = person.serialize(&Value::Object(record))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accessor;
pub mod checksum;
pub mod coerce;
pub mod config;
pub mod error;
pub mod layout;
pub mod marshaler;
pub mod message_type;
pub mod registry;
pub mod value;

pub use accessor::FieldAccess;
pub use checksum::Checksum;
pub use config::{BytesText, FieldNaming, MarshalConfig, MarshalOptions};
pub use error::{MarshalError, Result};
pub use layout::FieldLayout;
pub use marshaler::TypeMarshaler;
pub use message_type::MessageType;
pub use registry::{PoolSource, SchemaRegistry};
pub use value::{Record, Value};
