//! # IncidentX
//!
//! Prediction and similarity core for a crowd-sourced incident reporting
//! platform.
//!
//! IncidentX serves three capabilities over user-submitted incident reports:
//!
//! - **Fraud**: probability that a report is fraudulent, thresholded into a verdict
//! - **Risk**: a 0-100 severity score binned into low / medium / high / critical
//! - **Similarity**: nearest incidents in a reference corpus, and duplicate candidates
//!
//! Every request takes the same path: validate the raw attributes against the
//! capability's schema, project them into the fixed column layout the artifact
//! was fitted on, then score or rank.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! incidentx --fraud-model models/fraud_model.json \
//!           --risk-model models/risk_model.json \
//!           --corpus data/incidents.jsonl --http-port 5000
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use incidentx::prelude::*;
//! use serde_json::json;
//!
//! let context = ServiceContext::builder()
//!     .load_fraud_model("models/fraud_model.json")
//!     .build()
//!     .unwrap();
//!
//! let report = json!({"incident_type": "fire", "upvotes": 3});
//! let response = context.predict_fraud(report.as_object().unwrap(), 0.5);
//! println!("{:?}", response.fraud_probability);
//! ```
//!
//! ## Crate Structure
//!
//! - `incidentx-core` - Shared types (FeatureVector, Capability, error taxonomy)
//! - `incidentx-schema` - Schemas, validation, feature projection
//! - `incidentx-model` - Model artifacts and the fraud / risk adapters
//! - `incidentx-similarity` - Corpus index, similarity matrix, dataset statistics
//! - `incidentx-api` - Service context, health, REST

// Re-export core types
pub use incidentx_core::{Capability, Error, ErrorKind, FeatureVector, RawAttributes, Result, ValidationError};

// Re-export schema
pub use incidentx_schema::{templates, FeatureProjector, FieldSpec, SchemaRegistry, SchemaSpec};

// Re-export prediction
pub use incidentx_model::{
    FraudPrediction, FraudPredictor, ModelArtifact, RiskLevel, RiskPrediction, RiskPredictor, Scorer,
};

// Re-export similarity
pub use incidentx_similarity::{DatasetStats, SimilarityIndex, SimilarityMatch};

// Re-export API
pub use incidentx_api::{HealthReport, RestApi, ServiceContext};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Capability, Error, ErrorKind, FeatureVector, RawAttributes, Result,
        FeatureProjector, SchemaSpec,
        FraudPredictor, ModelArtifact, RiskLevel, RiskPredictor,
        SimilarityIndex,
        HealthReport, RestApi, ServiceContext,
    };
}
