//! Model artifacts
//!
//! An artifact pairs a scorer with the exact input contract it was fit on.
//! The schema is built from the artifact's own preprocessing state, never
//! from a request.
//!
//! ```json
//! {
//!   "capability": "fraud",
//!   "model_version": "fraud_v1.0",
//!   "preprocessing": {
//!     "expanded_columns": ["incident_type_fire", "...", "verified_user"],
//!     "rescale": [{"column": "upvotes", "min": 0, "max": 120}]
//!   },
//!   "estimator": {"type": "logistic", "intercept": -2.1, "coefficients": [...]}
//! }
//! ```

use crate::estimator::EstimatorSpec;
use crate::scorer::{FeatureRow, RawScore, Scorer};
use incidentx_core::{Capability, Error, FeatureVector, Result};
use incidentx_schema::{templates, FeatureProjector, FieldSpec, RescaleParams, SchemaSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Fitted preprocessing state as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessing {
    /// Raw field contract; the built-in template when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSpec>>,
    pub expanded_columns: Vec<String>,
    #[serde(default)]
    pub rescale: Vec<RescaleParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub capability: Capability,
    pub model_version: String,
    pub preprocessing: Preprocessing,
    pub estimator: EstimatorSpec,
}

/// A loaded, checked model artifact. Immutable once built.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    capability: Capability,
    model_version: String,
    source: Option<PathBuf>,
    projector: FeatureProjector,
    scorer: Arc<dyn Scorer>,
}

impl ModelArtifact {
    /// Wrap an arbitrary scorer. The schema's capability is the artifact's.
    pub fn new(
        model_version: impl Into<String>,
        schema: Arc<SchemaSpec>,
        scorer: Arc<dyn Scorer>,
    ) -> Self {
        Self {
            capability: schema.capability(),
            model_version: model_version.into(),
            source: None,
            projector: FeatureProjector::new(schema),
            scorer,
        }
    }

    pub fn from_file_def(file: ArtifactFile) -> Result<Self> {
        let ArtifactFile {
            capability,
            model_version,
            preprocessing,
            estimator,
        } = file;

        let wants_classifier = match capability {
            Capability::Fraud => true,
            Capability::Risk => false,
            Capability::Similarity => {
                return Err(Error::InvalidArtifact(
                    "similarity is served from a corpus, not a model artifact".into(),
                ))
            }
        };
        if estimator.is_classifier() != wants_classifier {
            return Err(Error::InvalidArtifact(format!(
                "{} estimator cannot serve {}",
                estimator.type_name(),
                capability
            )));
        }

        let fields = preprocessing
            .fields
            .unwrap_or_else(|| templates::fields_for(capability));
        let schema = SchemaSpec::new(
            capability,
            fields,
            preprocessing.expanded_columns,
            preprocessing.rescale,
        )?;
        let estimator = estimator.build(schema.expanded_columns())?;

        Ok(Self::new(model_version, Arc::new(schema), Arc::new(estimator)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: ArtifactFile = serde_json::from_str(json)?;
        Self::from_file_def(file)
    }

    /// Load and check an artifact file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let mut artifact = Self::from_json(&json)?;
        artifact.source = Some(path.to_path_buf());

        info!(
            "Loaded {} model {} from {} ({} columns, {})",
            artifact.capability,
            artifact.model_version,
            path.display(),
            artifact.schema().dim(),
            artifact.scorer.family()
        );
        Ok(artifact)
    }

    /// Fail unless this artifact serves `capability`
    pub fn expect_capability(self, capability: Capability) -> Result<Self> {
        if self.capability != capability {
            return Err(Error::InvalidArtifact(format!(
                "expected a {} artifact, found {}",
                capability, self.capability
            )));
        }
        Ok(self)
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn projector(&self) -> &FeatureProjector {
        &self.projector
    }

    pub fn schema(&self) -> &SchemaSpec {
        self.projector.schema()
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    /// Run the scorer on a projected vector.
    ///
    /// The vector must match this artifact's column layout; a mismatch is an
    /// internal consistency failure, and scorer failures become `Scoring`.
    pub fn score(&self, vector: &FeatureVector) -> Result<RawScore> {
        let columns = self.schema().expanded_columns();
        if vector.dim() != columns.len() {
            return Err(Error::InternalConsistency {
                expected: columns.len(),
                actual: vector.dim(),
            });
        }
        self.scorer
            .score(&FeatureRow::new(columns, vector.as_slice()))
            .map_err(|e| Error::Scoring(e.0))
    }

    /// Importance keyed by expanded column, in column order
    pub fn feature_importance(&self) -> Option<Vec<(String, f64)>> {
        let weights = self.scorer.feature_importance()?;
        let columns = self.schema().expanded_columns();
        if weights.len() != columns.len() {
            return None;
        }
        Some(columns.iter().cloned().zip(weights).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn risk_artifact_json() -> serde_json::Value {
        let fields = templates::risk_fields();
        let columns = templates::column_transformer_layout(&fields);
        let coefficients = vec![1.0; columns.len()];
        json!({
            "capability": "risk",
            "model_version": "risk_v1.0",
            "preprocessing": {"expanded_columns": columns},
            "estimator": {"type": "linear", "intercept": 5.0, "coefficients": coefficients}
        })
    }

    #[test]
    fn test_defaults_to_template_fields() {
        let artifact = ModelArtifact::from_json(&risk_artifact_json().to_string()).unwrap();
        assert_eq!(artifact.capability(), Capability::Risk);
        assert_eq!(artifact.model_version(), "risk_v1.0");
        assert_eq!(artifact.schema().fields().len(), 11);
        assert_eq!(artifact.schema().dim(), 20);
        assert_eq!(artifact.scorer().family(), "linear");
    }

    #[test]
    fn test_column_not_produced_by_fields_rejected() {
        let mut value = risk_artifact_json();
        value["preprocessing"]["expanded_columns"][0] = json!("incident_type_hail");
        let err = ModelArtifact::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, Error::InvalidArtifact(_)));
    }

    #[test]
    fn test_classifier_required_for_fraud() {
        let mut value = risk_artifact_json();
        value["capability"] = json!("fraud");
        let err = ModelArtifact::from_json(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("linear estimator cannot serve fraud"));
    }

    #[test]
    fn test_similarity_artifact_rejected() {
        let mut value = risk_artifact_json();
        value["capability"] = json!("similarity");
        assert!(ModelArtifact::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", risk_artifact_json()).unwrap();

        let artifact = ModelArtifact::load(file.path()).unwrap();
        assert_eq!(artifact.source(), Some(file.path()));
        assert!(artifact.clone().expect_capability(Capability::Fraud).is_err());
        assert!(artifact.expect_capability(Capability::Risk).is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ModelArtifact::load("/nonexistent/risk_model.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_score_rejects_wrong_width_vector() {
        let artifact = ModelArtifact::from_json(&risk_artifact_json().to_string()).unwrap();
        let err = artifact.score(&FeatureVector::zeros(19)).unwrap_err();
        assert!(matches!(err, Error::InternalConsistency { expected: 20, actual: 19 }));
        assert!(artifact.score(&FeatureVector::zeros(20)).is_ok());
    }

    #[test]
    fn test_feature_importance_keyed_by_column() {
        let artifact = ModelArtifact::from_json(&risk_artifact_json().to_string()).unwrap();
        let importance = artifact.feature_importance().unwrap();
        assert_eq!(importance.len(), 20);
        assert_eq!(importance[0].0, "incident_type_fire");
        assert!((importance.iter().map(|(_, w)| w).sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
