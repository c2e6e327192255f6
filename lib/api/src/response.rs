//! Transport-agnostic response shapes.
//!
//! Every response carries `success`; a failed one carries `error` (the
//! message) and `error_kind` (the tag callers branch on), with capability
//! fields left null.

use incidentx_core::{Capability, Error, ErrorKind, RawAttributes, Result};
use incidentx_model::{FraudPrediction, RiskLevel, RiskPrediction};
use incidentx_similarity::{top_match_score, SimilarityMatch};
use serde::Serialize;
use tracing::{error, warn};

/// Log a request failure once: caller errors at warn, system errors at error
pub(crate) fn log_failure(capability: Capability, err: &Error) {
    match err.kind() {
        ErrorKind::Validation => warn!("{} request rejected: {}", capability, err),
        _ => error!("{} request failed: {}", capability, err),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudResponse {
    pub success: bool,
    pub fraud_probability: Option<f64>,
    pub is_fraud: Option<bool>,
    pub confidence: Option<f64>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub model_version: Option<String>,
}

impl FraudResponse {
    pub fn from_result(result: Result<FraudPrediction>, model_version: Option<&str>) -> Self {
        let model_version = model_version.map(str::to_string);
        match result {
            Ok(p) => Self {
                success: true,
                fraud_probability: Some(p.fraud_probability),
                is_fraud: Some(p.is_fraud),
                confidence: Some(p.confidence),
                error: None,
                error_kind: None,
                model_version,
            },
            Err(e) => {
                log_failure(Capability::Fraud, &e);
                Self {
                    success: false,
                    fraud_probability: None,
                    is_fraud: None,
                    confidence: None,
                    error: Some(e.to_string()),
                    error_kind: Some(e.kind()),
                    model_version,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskResponse {
    pub success: bool,
    pub risk_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub confidence: Option<f64>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub model_version: Option<String>,
}

impl RiskResponse {
    pub fn from_result(result: Result<RiskPrediction>, model_version: Option<&str>) -> Self {
        let model_version = model_version.map(str::to_string);
        match result {
            Ok(p) => Self {
                success: true,
                risk_score: Some(p.risk_score),
                risk_level: Some(p.risk_level),
                confidence: Some(p.confidence),
                error: None,
                error_kind: None,
                model_version,
            },
            Err(e) => {
                log_failure(Capability::Risk, &e);
                Self {
                    success: false,
                    risk_score: None,
                    risk_level: None,
                    confidence: None,
                    error: Some(e.to_string()),
                    error_kind: Some(e.kind()),
                    model_version,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResponse {
    pub success: bool,
    /// Matched corpus records, best first, unmodified
    pub similar_incidents: Option<Vec<RawAttributes>>,
    /// Parallel to `similar_incidents`
    pub similarity_scores: Option<Vec<f64>>,
    pub top_match_score: Option<f64>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl SimilarityResponse {
    pub fn from_result(result: Result<Vec<SimilarityMatch<'_>>>) -> Self {
        match result {
            Ok(matches) => Self {
                success: true,
                top_match_score: Some(top_match_score(&matches)),
                similar_incidents: Some(matches.iter().map(|m| m.entry.record.clone()).collect()),
                similarity_scores: Some(matches.iter().map(|m| m.score).collect()),
                error: None,
                error_kind: None,
            },
            Err(e) => {
                log_failure(Capability::Similarity, &e);
                Self {
                    success: false,
                    similar_incidents: None,
                    similarity_scores: None,
                    top_match_score: None,
                    error: Some(e.to_string()),
                    error_kind: Some(e.kind()),
                }
            }
        }
    }
}

/// Response-level view shared by the REST layer
pub trait Outcome {
    fn error_kind(&self) -> Option<ErrorKind>;
}

impl Outcome for FraudResponse {
    fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }
}

impl Outcome for RiskResponse {
    fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }
}

impl Outcome for SimilarityResponse {
    fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incidentx_core::ValidationError;
    use serde_json::json;

    #[test]
    fn test_fraud_success_shape() {
        let prediction = FraudPrediction::from_probability(0.9, 0.5);
        let response = FraudResponse::from_result(Ok(prediction), Some("fraud_v1.0"));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["is_fraud"], json!(true));
        assert_eq!(value["error"], json!(null));
        assert_eq!(value["model_version"], json!("fraud_v1.0"));
    }

    #[test]
    fn test_failure_carries_kind() {
        let err: Error = ValidationError::TypeMismatch("upvotes".into()).into();
        let response = RiskResponse::from_result(Err(err), Some("risk_v1.0"));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"], json!("upvotes must be numeric"));
        assert_eq!(value["error_kind"], json!("validation"));
        assert_eq!(value["risk_score"], json!(null));
    }

    #[test]
    fn test_unavailable_model() {
        let response = FraudResponse::from_result(Err(Error::ModelUnavailable(Capability::Fraud)), None);
        assert_eq!(response.error.as_deref(), Some("Model not loaded: fraud"));
        assert_eq!(response.error_kind(), Some(ErrorKind::Unavailable));
    }

    #[test]
    fn test_empty_similarity_has_zero_top_score() {
        let response = SimilarityResponse::from_result(Ok(Vec::new()));
        assert!(response.success);
        assert_eq!(response.top_match_score, Some(0.0));
        assert_eq!(response.similar_incidents, Some(Vec::new()));
    }
}
