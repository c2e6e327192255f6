//! Health and readiness reporting

use incidentx_core::Capability;
use incidentx_schema::{FieldKind, SchemaSpec};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// What a capability expects from callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaSummary {
    pub required_fields: Vec<String>,
    pub categorical_domains: BTreeMap<String, Vec<String>>,
    pub expanded_columns: usize,
}

impl SchemaSummary {
    pub fn of(schema: &SchemaSpec) -> Self {
        let categorical_domains = schema
            .fields()
            .iter()
            .filter_map(|f| match &f.kind {
                FieldKind::Categorical { categories } => Some((f.name.clone(), categories.clone())),
                FieldKind::Numeric { .. } => None,
            })
            .collect();

        Self {
            required_fields: schema.required_fields().map(str::to_string).collect(),
            categorical_domains,
            expanded_columns: schema.dim(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityHealth {
    pub capability: Capability,
    pub status: HealthStatus,
    pub loaded: bool,
    /// Artifact or corpus path
    pub source: Option<String>,
    pub model_version: Option<String>,
    /// Corpus size, similarity only
    pub dataset_size: Option<usize>,
    pub schema: Option<SchemaSummary>,
    /// Load failure
    pub error: Option<String>,
}

impl CapabilityHealth {
    pub fn failed(capability: Capability, source: Option<String>, error: String) -> Self {
        Self {
            capability,
            status: HealthStatus::Unhealthy,
            loaded: false,
            source,
            model_version: None,
            dataset_size: None,
            schema: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub capabilities: Vec<CapabilityHealth>,
    /// RFC 3339
    pub timestamp: String,
}

impl HealthReport {
    /// Healthy only when every capability is
    pub fn new(capabilities: Vec<CapabilityHealth>) -> Self {
        let status = if capabilities.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            capabilities,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn capability(&self, capability: Capability) -> Option<&CapabilityHealth> {
        self.capabilities.iter().find(|c| c.capability == capability)
    }
}
