//! Risk prediction adapter
//!
//! Scores are clamped to [0, 100] and binned into four ordered levels.

use crate::artifact::ModelArtifact;
use crate::scorer::RawScore;
use incidentx_core::{numeric_or, Capability, Error, FeatureVector, RawAttributes, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Half-open `[low, high)` bins in ascending order; the last one is a catch-all
pub const RISK_BINS: [(RiskLevel, f64, f64); 4] = [
    (RiskLevel::Low, 0.0, 30.0),
    (RiskLevel::Medium, 30.0, 60.0),
    (RiskLevel::High, 60.0, 80.0),
    (RiskLevel::Critical, 80.0, f64::INFINITY),
];

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn from_score(score: f64) -> Self {
        RISK_BINS
            .iter()
            .find(|(_, low, high)| *low <= score && score < *high)
            .map(|(level, _, _)| *level)
            .unwrap_or(RiskLevel::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
}

/// Additive confidence heuristic over the score and three raw attributes.
///
/// Not derived from model uncertainty. Kept exactly as observed: base
/// `score / 100` (0.1 when the score is 0), +0.1 for reported injuries, +0.1
/// near a sensitive location, +0.05 for more than three people, capped at 1.
pub fn risk_confidence(score: f64, raw: &RawAttributes) -> f64 {
    let base = if score > 0.0 { (score / 100.0).min(1.0) } else { 0.1 };

    let mut boost = 0.0;
    if numeric_or(raw, "injuries_reported", 0.0) > 0.0 {
        boost += 0.1;
    }
    if numeric_or(raw, "near_sensitive_location", 0.0) == 1.0 {
        boost += 0.1;
    }
    if numeric_or(raw, "people_involved", 1.0) > 3.0 {
        boost += 0.05;
    }
    (base + boost).min(1.0)
}

/// Count of predictions per level over a batch; failed rows are skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl RiskDistribution {
    pub fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Critical => self.critical += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.critical
    }
}

#[derive(Debug, Clone)]
pub struct RiskPredictor {
    artifact: Arc<ModelArtifact>,
}

impl RiskPredictor {
    pub fn new(artifact: Arc<ModelArtifact>) -> Result<Self> {
        if artifact.capability() != Capability::Risk {
            return Err(Error::InvalidArtifact(format!(
                "risk predictor given a {} artifact",
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

    pub fn predict(&self, raw: &RawAttributes) -> Result<RiskPrediction> {
        let vector = self.artifact.projector().prepare(raw)?;
        self.predict_vector(&vector, raw)
    }

    /// Score a projected vector; `raw` feeds the confidence heuristic only
    pub fn predict_vector(&self, vector: &FeatureVector, raw: &RawAttributes) -> Result<RiskPrediction> {
        let raw_score = match self.artifact.score(vector)? {
            RawScore::Value(v) => v,
            RawScore::ClassProbabilities(_) => {
                return Err(Error::Scoring("expected a score, got class probabilities".into()))
            }
        };
        if raw_score.is_nan() {
            return Err(Error::Scoring("score is NaN".into()));
        }

        let risk_score = raw_score.clamp(0.0, 100.0);
        Ok(RiskPrediction {
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            confidence: risk_confidence(risk_score, raw),
        })
    }

    pub fn predict_batch(&self, rows: &[RawAttributes]) -> Vec<Result<RiskPrediction>> {
        rows.par_iter().map(|raw| self.predict(raw)).collect()
    }

    pub fn distribution(&self, rows: &[RawAttributes]) -> RiskDistribution {
        let mut distribution = RiskDistribution::default();
        for prediction in self.predict_batch(rows).into_iter().flatten() {
            distribution.record(prediction.risk_level);
        }
        distribution
    }
}
