//! Schema Registry
//!
//! Owns a descriptor pool and the cache of compiled [`TypeMarshaler`]s for the
//! message types in it. A marshaler is compiled on first reference to its type
//! and reused for the lifetime of the registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use prost_reflect::{DescriptorPool, MessageDescriptor};
use tracing::{debug, trace};

use crate::checksum::Checksum;
use crate::config::MarshalOptions;
use crate::error::Result;
use crate::marshaler::TypeMarshaler;
use crate::message_type::MessageType;

/// Where a registry's descriptor pool came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolSource {
    /// The process-wide pool of built-in types, shared by every registry bound to it
    Builtin,
    /// A private pool linked from a serialized descriptor set
    DescriptorSet { checksum: Checksum },
}

/// The main schema registry
#[derive(Debug)]
pub struct SchemaRegistry {
    pool: DescriptorPool,
    source: PoolSource,
    options: MarshalOptions,
    /// Compiled marshalers keyed by full type name, at most one per descriptor.
    /// Names are unique within the single pool a registry owns.
    marshalers: RefCell<HashMap<String, Rc<TypeMarshaler>>>,
}

impl SchemaRegistry {
    /// Open a registry.
    ///
    /// Without descriptor bytes the registry binds to the process-wide built-in
    /// pool. With bytes, they are parsed as a serialized `FileDescriptorSet` and
    /// linked into a pool owned by this registry.
    pub fn open(descriptor_set: Option<&[u8]>) -> Result<Self> {
        Self::open_with(descriptor_set, MarshalOptions::default())
    }

    /// Open a registry with explicit conversion options
    pub fn open_with(descriptor_set: Option<&[u8]>, options: MarshalOptions) -> Result<Self> {
        let (pool, source) = match descriptor_set {
            None => (DescriptorPool::global(), PoolSource::Builtin),
            Some(bytes) => {
                let pool = DescriptorPool::decode(bytes)?;
                let checksum = Checksum::from_bytes(bytes);
                (pool, PoolSource::DescriptorSet { checksum })
            }
        };

        Ok(Self::with_pool(pool, source, options))
    }

    /// Registry bound to the built-in pool
    pub fn builtin() -> Self {
        Self::with_pool(DescriptorPool::global(), PoolSource::Builtin, MarshalOptions::default())
    }

    fn with_pool(pool: DescriptorPool, source: PoolSource, options: MarshalOptions) -> Self {
        debug!(
            files = pool.files().count(),
            messages = pool.all_messages().count(),
            builtin = matches!(source, PoolSource::Builtin),
            "opened schema registry"
        );

        Self {
            pool,
            source,
            options,
            marshalers: RefCell::new(HashMap::new()),
        }
    }

    /// Open a registry from a descriptor set file on disk
    pub fn from_file(path: impl AsRef<Path>, options: MarshalOptions) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        Self::open_with(Some(&bytes), options)
    }

    /// Look up a message type by fully-qualified name.
    ///
    /// Unknown names yield `None`. A leading `.` is accepted.
    pub fn resolve(&self, type_name: &str) -> Option<MessageType<'_>> {
        let name = type_name.strip_prefix('.').unwrap_or(type_name);
        let descriptor = self.pool.get_message_by_name(name)?;
        Some(MessageType::new(self, self.marshaler_for(&descriptor)))
    }

    /// Cached marshaler for a descriptor of this registry's pool, compiled on
    /// first request. Descriptors from other pools yield `None`.
    pub fn type_marshaler(&self, descriptor: &MessageDescriptor) -> Option<Rc<TypeMarshaler>> {
        if descriptor.parent_pool() != &self.pool {
            return None;
        }
        Some(self.marshaler_for(descriptor))
    }

    pub(crate) fn marshaler_for(&self, descriptor: &MessageDescriptor) -> Rc<TypeMarshaler> {
        if let Some(marshaler) = self.marshalers.borrow().get(descriptor.full_name()) {
            trace!(type_name = descriptor.full_name(), "type marshaler cache hit");
            return Rc::clone(marshaler);
        }

        let marshaler = Rc::new(TypeMarshaler::new(descriptor.clone(), self.options));
        debug!(
            type_name = descriptor.full_name(),
            fields = marshaler.layout().len(),
            "compiled type marshaler"
        );
        self.marshalers
            .borrow_mut()
            .insert(descriptor.full_name().to_string(), Rc::clone(&marshaler));
        marshaler
    }

    /// Fully-qualified names of every message type in the pool, sorted
    pub fn message_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .pool
            .all_messages()
            .map(|descriptor| descriptor.full_name().to_string())
            .collect();
        names.sort();
        names
    }

    /// Number of marshalers compiled so far
    pub fn compiled_count(&self) -> usize {
        self.marshalers.borrow().len()
    }

    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    pub fn source(&self) -> &PoolSource {
        &self.source
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.source, PoolSource::Builtin)
    }

    /// Fingerprint of the descriptor-set bytes this registry was opened with
    pub fn descriptor_checksum(&self) -> Option<&Checksum> {
        match &self.source {
            PoolSource::Builtin => None,
            PoolSource::DescriptorSet { checksum } => Some(checksum),
        }
    }

    pub fn options(&self) -> &MarshalOptions {
        &self.options
    }
}
