//! # IncidentX Model
//!
//! Prediction adapters over opaque, pre-fitted scoring functions.
//!
//! - [`ModelArtifact`] - a scorer plus the schema it was fit on, loaded from JSON
//! - [`Scorer`] - the scoring boundary; bundled [`Estimator`]s or test fixtures
//! - [`FraudPredictor`] - class probability, thresholded label, boundary-distance confidence
//! - [`RiskPredictor`] - clamped score, binned [`RiskLevel`], heuristic confidence

pub mod artifact;
pub mod estimator;
pub mod fraud;
pub mod risk;
pub mod scorer;

pub use artifact::{ArtifactFile, ModelArtifact, Preprocessing};
pub use estimator::{Estimator, EstimatorSpec, NodeSpec, TreeSpec};
pub use fraud::{check_threshold, fraud_confidence, FraudPrediction, FraudPredictor, DEFAULT_THRESHOLD};
pub use risk::{risk_confidence, RiskDistribution, RiskLevel, RiskPrediction, RiskPredictor, RISK_BINS};
pub use scorer::{FeatureRow, RawScore, ScoreError, Scorer};
