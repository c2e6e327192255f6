//! Service context
//!
//! Everything a request needs, loaded once and read-only afterwards. Each
//! capability slot is either ready or records why it failed to load; a
//! request against a failed slot is answered with an "unavailable" error,
//! never with partially initialized state.

use crate::health::{CapabilityHealth, HealthReport, HealthStatus, SchemaSummary};
use crate::response::{FraudResponse, RiskResponse, SimilarityResponse};
use incidentx_core::{Capability, Error, RawAttributes, Result};
use incidentx_model::{FraudPredictor, ModelArtifact, RiskDistribution, RiskPredictor};
use incidentx_schema::SchemaRegistry;
use incidentx_similarity::{DatasetStats, SimilarityIndex};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone)]
enum Slot<T> {
    Ready(T),
    Failed { source: Option<String>, reason: String },
}

impl<T> Slot<T> {
    fn not_configured() -> Self {
        Slot::Failed {
            source: None,
            reason: "not configured".into(),
        }
    }

    fn from_load(capability: Capability, path: &Path, result: Result<T>) -> Self {
        match result {
            Ok(value) => Slot::Ready(value),
            Err(e) => {
                error!("Failed to load {} from {}: {}", capability, path.display(), e);
                Slot::Failed {
                    source: Some(path.display().to_string()),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn ready(&self) -> Option<&T> {
        match self {
            Slot::Ready(value) => Some(value),
            Slot::Failed { .. } => None,
        }
    }

    fn failure(&self) -> Option<&str> {
        match self {
            Slot::Ready(_) => None,
            Slot::Failed { reason, .. } => Some(reason),
        }
    }
}

/// Immutable, shareable state behind every capability
#[derive(Debug, Clone)]
pub struct ServiceContext {
    registry: SchemaRegistry,
    fraud: Slot<FraudPredictor>,
    risk: Slot<RiskPredictor>,
    similarity: Slot<SimilarityIndex>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::default()
    }

    /// Schemas of the capabilities that loaded
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn fraud(&self) -> Result<&FraudPredictor> {
        self.fraud.ready().ok_or(Error::ModelUnavailable(Capability::Fraud))
    }

    pub fn risk(&self) -> Result<&RiskPredictor> {
        self.risk.ready().ok_or(Error::ModelUnavailable(Capability::Risk))
    }

    pub fn similarity(&self) -> Result<&SimilarityIndex> {
        self.similarity.ready().ok_or(Error::CorpusUnavailable)
    }

    /// Capabilities that failed to load, with the reason
    pub fn failures(&self) -> Vec<(Capability, &str)> {
        [
            (Capability::Fraud, self.fraud.failure()),
            (Capability::Risk, self.risk.failure()),
            (Capability::Similarity, self.similarity.failure()),
        ]
        .into_iter()
        .filter_map(|(capability, reason)| reason.map(|r| (capability, r)))
        .collect()
    }

    pub fn predict_fraud(&self, raw: &RawAttributes, threshold: f64) -> FraudResponse {
        let predictor = self.fraud.ready();
        FraudResponse::from_result(
            self.fraud().and_then(|p| p.predict(raw, threshold)),
            predictor.map(|p| p.model_version()),
        )
    }

    pub fn predict_fraud_batch(&self, rows: &[RawAttributes], threshold: f64) -> Vec<FraudResponse> {
        match self.fraud() {
            Ok(predictor) => predictor
                .predict_batch(rows, threshold)
                .into_iter()
                .map(|r| FraudResponse::from_result(r, Some(predictor.model_version())))
                .collect(),
            Err(_) => rows
                .iter()
                .map(|_| FraudResponse::from_result(Err(Error::ModelUnavailable(Capability::Fraud)), None))
                .collect(),
        }
    }

    pub fn predict_risk(&self, raw: &RawAttributes) -> RiskResponse {
        let predictor = self.risk.ready();
        RiskResponse::from_result(
            self.risk().and_then(|p| p.predict(raw)),
            predictor.map(|p| p.model_version()),
        )
    }

    pub fn predict_risk_batch(&self, rows: &[RawAttributes]) -> Vec<RiskResponse> {
        match self.risk() {
            Ok(predictor) => predictor
                .predict_batch(rows)
                .into_iter()
                .map(|r| RiskResponse::from_result(r, Some(predictor.model_version())))
                .collect(),
            Err(_) => rows
                .iter()
                .map(|_| RiskResponse::from_result(Err(Error::ModelUnavailable(Capability::Risk)), None))
                .collect(),
        }
    }

    pub fn risk_distribution(&self, rows: &[RawAttributes]) -> Result<RiskDistribution> {
        Ok(self.risk()?.distribution(rows))
    }

    pub fn find_similar(&self, raw: &RawAttributes, top_k: usize, min_similarity: f64) -> SimilarityResponse {
        SimilarityResponse::from_result(
            self.similarity()
                .and_then(|index| index.query(raw, top_k, min_similarity)),
        )
    }

    pub fn find_duplicates(&self, raw: &RawAttributes, threshold: f64) -> SimilarityResponse {
        SimilarityResponse::from_result(
            self.similarity()
                .and_then(|index| index.find_duplicates(raw, threshold)),
        )
    }

    pub fn similarity_matrix(&self, rows: &[RawAttributes]) -> Result<Vec<Vec<f64>>> {
        self.similarity()?.similarity_matrix(rows)
    }

    pub fn dataset_stats(&self) -> Result<&DatasetStats> {
        Ok(self.similarity()?.stats())
    }

    /// Importance per expanded column; empty when the model family has none.
    /// Similarity has no model and always reports empty.
    pub fn feature_importance(&self, capability: Capability) -> Result<Vec<(String, f64)>> {
        let artifact = match capability {
            Capability::Fraud => self.fraud()?.artifact(),
            Capability::Risk => self.risk()?.artifact(),
            Capability::Similarity => return Ok(Vec::new()),
        };
        Ok(artifact.feature_importance().unwrap_or_default())
    }

    pub fn health(&self) -> HealthReport {
        HealthReport::new(vec![
            model_health(Capability::Fraud, &self.fraud, FraudPredictor::artifact),
            model_health(Capability::Risk, &self.risk, RiskPredictor::artifact),
            corpus_health(&self.similarity),
        ])
    }
}

fn model_health<P>(capability: Capability, slot: &Slot<P>, artifact: fn(&P) -> &ModelArtifact) -> CapabilityHealth {
    match slot {
        Slot::Ready(predictor) => {
            let artifact = artifact(predictor);
            CapabilityHealth {
                capability,
                status: HealthStatus::Healthy,
                loaded: true,
                source: artifact.source().map(|p| p.display().to_string()),
                model_version: Some(artifact.model_version().to_string()),
                dataset_size: None,
                schema: Some(SchemaSummary::of(artifact.schema())),
                error: None,
            }
        }
        Slot::Failed { source, reason } => CapabilityHealth::failed(capability, source.clone(), reason.clone()),
    }
}

fn corpus_health(slot: &Slot<SimilarityIndex>) -> CapabilityHealth {
    match slot {
        Slot::Ready(index) => CapabilityHealth {
            capability: Capability::Similarity,
            status: HealthStatus::Healthy,
            loaded: true,
            source: index.source().map(|p| p.display().to_string()),
            model_version: None,
            dataset_size: Some(index.len()),
            schema: Some(SchemaSummary::of(index.schema())),
            error: None,
        },
        Slot::Failed { source, reason } => {
            CapabilityHealth::failed(Capability::Similarity, source.clone(), reason.clone())
        }
    }
}

/// Assembles a [`ServiceContext`]. Capabilities not given stay unavailable.
#[derive(Debug)]
pub struct ServiceContextBuilder {
    fraud: Slot<FraudPredictor>,
    risk: Slot<RiskPredictor>,
    similarity: Slot<SimilarityIndex>,
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self {
            fraud: Slot::not_configured(),
            risk: Slot::not_configured(),
            similarity: Slot::not_configured(),
        }
    }
}

impl ServiceContextBuilder {
    /// Use an already built fraud artifact
    pub fn fraud_model(mut self, artifact: ModelArtifact) -> Result<Self> {
        self.fraud = Slot::Ready(FraudPredictor::new(Arc::new(artifact))?);
        Ok(self)
    }

    pub fn risk_model(mut self, artifact: ModelArtifact) -> Result<Self> {
        self.risk = Slot::Ready(RiskPredictor::new(Arc::new(artifact))?);
        Ok(self)
    }

    pub fn corpus(mut self, index: SimilarityIndex) -> Self {
        self.similarity = Slot::Ready(index);
        self
    }

    /// Load the fraud artifact; a failure is recorded, not returned
    pub fn load_fraud_model<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        let result = ModelArtifact::load(path)
            .and_then(|a| a.expect_capability(Capability::Fraud))
            .and_then(|a| FraudPredictor::new(Arc::new(a)));
        self.fraud = Slot::from_load(Capability::Fraud, path, result);
        self
    }

    pub fn load_risk_model<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        let result = ModelArtifact::load(path)
            .and_then(|a| a.expect_capability(Capability::Risk))
            .and_then(|a| RiskPredictor::new(Arc::new(a)));
        self.risk = Slot::from_load(Capability::Risk, path, result);
        self
    }

    pub fn load_corpus<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        let result = SimilarityIndex::load(path);
        self.similarity = Slot::from_load(Capability::Similarity, path, result);
        self
    }

    pub fn build(self) -> Result<ServiceContext> {
        let mut registry = SchemaRegistry::builder();
        if let Some(p) = self.fraud.ready() {
            registry = registry.register(p.artifact().projector().shared_schema())?;
        }
        if let Some(p) = self.risk.ready() {
            registry = registry.register(p.artifact().projector().shared_schema())?;
        }
        if let Some(index) = self.similarity.ready() {
            registry = registry.register(index.projector().shared_schema())?;
        }
        let registry = registry.build();

        info!(
            "Service context ready: {:?} loaded",
            registry.capabilities().iter().map(Capability::as_str).collect::<Vec<_>>()
        );

        Ok(ServiceContext {
            registry,
            fraud: self.fraud,
            risk: self.risk,
            similarity: self.similarity,
        })
    }
}
