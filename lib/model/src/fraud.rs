//! Fraud prediction adapter

use crate::artifact::ModelArtifact;
use crate::scorer::RawScore;
use incidentx_core::{Capability, Error, FeatureVector, RawAttributes, Result, ValidationError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudPrediction {
    pub fraud_probability: f64,
    pub is_fraud: bool,
    pub confidence: f64,
}

impl FraudPrediction {
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        Self {
            fraud_probability: probability,
            is_fraud: probability >= threshold,
            confidence: fraud_confidence(probability, threshold),
        }
    }
}

/// Distance from the decision boundary, normalized by the larger side of
/// the threshold split. 0 at the boundary, 1 at the far extreme.
pub fn fraud_confidence(probability: f64, threshold: f64) -> f64 {
    ((probability - threshold).abs() / threshold.max(1.0 - threshold)).min(1.0)
}

/// Accept any finite threshold. Values outside [0, 1] are legal: below 0
/// flags everything, above 1 flags nothing.
pub fn check_threshold(threshold: f64) -> std::result::Result<f64, ValidationError> {
    if threshold.is_finite() {
        Ok(threshold)
    } else {
        Err(ValidationError::InvalidThreshold(threshold))
    }
}

#[derive(Debug, Clone)]
pub struct FraudPredictor {
    artifact: Arc<ModelArtifact>,
}

impl FraudPredictor {
    pub fn new(artifact: Arc<ModelArtifact>) -> Result<Self> {
        if artifact.capability() != Capability::Fraud {
            return Err(Error::InvalidArtifact(format!(
                "fraud predictor given a {} artifact",
                artifact.capability()
            )));
        }
        Ok(Self { artifact })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn model_version(&self) -> &str {
        self.artifact.model_version()
    }

    /// Validate, project and score one request
    pub fn predict(&self, raw: &RawAttributes, threshold: f64) -> Result<FraudPrediction> {
        let threshold = check_threshold(threshold)?;
        let vector = self.artifact.projector().prepare(raw)?;
        self.predict_vector(&vector, threshold)
    }

    pub fn predict_vector(&self, vector: &FeatureVector, threshold: f64) -> Result<FraudPrediction> {
        let probability = match self.artifact.score(vector)? {
            RawScore::ClassProbabilities(ps) => ps.get(1).copied().ok_or_else(|| {
                Error::Scoring(format!("expected 2 class probabilities, got {}", ps.len()))
            })?,
            RawScore::Value(_) => {
                return Err(Error::Scoring("expected class probabilities, got a value".into()))
            }
        };
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::Scoring(format!("probability {} outside [0, 1]", probability)));
        }
        Ok(FraudPrediction::from_probability(probability, threshold))
    }

    /// Independent predictions, in input order
    pub fn predict_batch(&self, rows: &[RawAttributes], threshold: f64) -> Vec<Result<FraudPrediction>> {
        rows.par_iter().map(|raw| self.predict(raw, threshold)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{FeatureRow, ScoreError, Scorer};
    use incidentx_schema::{templates, SchemaSpec};
    use serde_json::json;

    #[derive(Debug)]
    struct FixedScorer(RawScore);

    impl Scorer for FixedScorer {
        fn score(&self, _row: &FeatureRow<'_>) -> std::result::Result<RawScore, ScoreError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct FailingScorer;

    impl Scorer for FailingScorer {
        fn score(&self, _row: &FeatureRow<'_>) -> std::result::Result<RawScore, ScoreError> {
            Err(ScoreError("estimator exploded".into()))
        }
    }

    fn predictor(scorer: impl Scorer + 'static) -> FraudPredictor {
        let fields = templates::fraud_fields();
        let columns = templates::column_transformer_layout(&fields);
        let schema = SchemaSpec::new(Capability::Fraud, fields, columns, vec![]).unwrap();
        let artifact = ModelArtifact::new("fraud_v1.0", Arc::new(schema), Arc::new(scorer));
        FraudPredictor::new(Arc::new(artifact)).unwrap()
    }

    fn stub(probability: f64) -> FixedScorer {
        FixedScorer(RawScore::ClassProbabilities(vec![1.0 - probability, probability]))
    }

    fn request() -> RawAttributes {
        json!({
            "incident_type": "fire",
            "description_length": 8,
            "has_media": 0,
            "upvotes": 0,
            "flags": 4,
            "duplicate_score": 0.85,
            "similarity_to_previous": 0.92,
            "posted_at_night": 1,
            "account_age_days": 3,
            "total_reports_by_user": 18,
            "past_fraud_reports": 2,
            "user_total_flags": 10,
            "verified_user": 0
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn test_suspicious_report_scenario() {
        let prediction = predictor(stub(0.9)).predict(&request(), DEFAULT_THRESHOLD).unwrap();
        assert!(prediction.is_fraud);
        assert_eq!(prediction.fraud_probability, 0.9);
        assert!((prediction.confidence - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_zero_at_boundary() {
        let prediction = predictor(stub(0.5)).predict(&request(), 0.5).unwrap();
        assert!(prediction.is_fraud);
        assert_eq!(prediction.confidence, 0.0);
    }

    #[test]
    fn test_confidence_with_skewed_threshold() {
        // max(0.2, 0.8) normalizes the distance
        assert!((fraud_confidence(0.6, 0.2) - 0.5).abs() < 1e-12);
        assert_eq!(fraud_confidence(0.0, 0.2), 0.25);
        assert_eq!(fraud_confidence(1.0, 0.0), 1.0);
    }

    #[test]
    fn test_threshold_outside_unit_interval() {
        let predictor = predictor(stub(0.9));

        let above = predictor.predict(&request(), 1.5).unwrap();
        assert!(!above.is_fraud);
        // |0.9 - 1.5| / max(1.5, -0.5)
        assert!((above.confidence - 0.4).abs() < 1e-12);

        let below = predictor.predict(&request(), -0.5).unwrap();
        assert!(below.is_fraud);
        // |0.9 + 0.5| / max(-0.5, 1.5)
        assert!((below.confidence - 1.4 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let err = predictor(stub(0.9)).predict(&request(), f64::NAN).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidThreshold(t)) if t.is_nan()));
        assert!(check_threshold(f64::INFINITY).is_err());
        assert!(check_threshold(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validation_precedes_scoring() {
        let mut raw = request();
        raw.remove("verified_user");
        let err = predictor(FailingScorer).predict(&raw, DEFAULT_THRESHOLD).unwrap_err();
        assert_eq!(err.to_string(), "Missing required features: [\"verified_user\"]");
    }

    #[test]
    fn test_scorer_failure_is_reported() {
        let err = predictor(FailingScorer).predict(&request(), DEFAULT_THRESHOLD).unwrap_err();
        assert!(matches!(err, Error::Scoring(ref detail) if detail == "estimator exploded"));
        assert_eq!(err.to_string(), "Prediction error: estimator exploded");
    }

    #[test]
    fn test_regression_output_rejected() {
        let err = predictor(FixedScorer(RawScore::Value(0.7)))
            .predict(&request(), DEFAULT_THRESHOLD)
            .unwrap_err();
        assert!(matches!(err, Error::Scoring(_)));
    }

    #[test]
    fn test_batch_preserves_order() {
        let mut bad = request();
        bad.insert("incident_type".into(), json!("meteor"));
        let results = predictor(stub(0.2)).predict_batch(&[request(), bad, request()], 0.5);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Validation(ValidationError::InvalidCategory { .. }))));
        assert!(!results[2].as_ref().unwrap().is_fraud);
    }

    #[test]
    fn test_rejects_risk_artifact() {
        let fields = templates::risk_fields();
        let columns = templates::column_transformer_layout(&fields);
        let schema = SchemaSpec::new(Capability::Risk, fields, columns, vec![]).unwrap();
        let artifact = ModelArtifact::new("risk_v1.0", Arc::new(schema), Arc::new(stub(0.1)));
        assert!(FraudPredictor::new(Arc::new(artifact)).is_err());
    }
}
