//! Schema Registry
//!
//! One immutable [`SchemaSpec`] per capability, assembled once at startup.

use crate::schema::{SchemaError, SchemaSpec};
use ahash::AHashMap;
use incidentx_core::{Capability, Error, Result};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: AHashMap<Capability, Arc<SchemaSpec>>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Schema for a capability, or `UnknownCapability` if none was registered
    pub fn get(&self, capability: Capability) -> Result<Arc<SchemaSpec>> {
        self.entries
            .get(&capability)
            .cloned()
            .ok_or_else(|| Error::UnknownCapability(capability.to_string()))
    }

    /// Lookup by capability name
    pub fn get_by_name(&self, name: &str) -> Result<Arc<SchemaSpec>> {
        self.get(name.parse()?)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.entries.contains_key(&capability)
    }

    /// Registered capabilities in canonical order
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.entries.contains_key(c))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    entries: AHashMap<Capability, Arc<SchemaSpec>>,
}

impl SchemaRegistryBuilder {
    /// Register a schema under its own capability. Each capability at most once.
    pub fn register(mut self, schema: Arc<SchemaSpec>) -> std::result::Result<Self, SchemaError> {
        let capability = schema.capability();
        if self.entries.insert(capability, schema).is_some() {
            return Err(SchemaError::DuplicateCapability(capability));
        }
        Ok(self)
    }

    pub fn build(self) -> SchemaRegistry {
        SchemaRegistry {
            entries: self.entries,
        }
    }
}
