//! The opaque scoring boundary.
//!
//! Anything that turns an ordered feature row into a number can back a
//! capability: the bundled estimators, or a fixture in tests.

use std::fmt;
use thiserror::Error;

/// A single projected row, with the column names the artifact was fit on
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow<'a> {
    pub columns: &'a [String],
    pub values: &'a [f64],
}

impl<'a> FeatureRow<'a> {
    pub fn new(columns: &'a [String], values: &'a [f64]) -> Self {
        Self { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What a scorer produced
#[derive(Debug, Clone, PartialEq)]
pub enum RawScore {
    /// One probability per class; index 1 is the positive class
    ClassProbabilities(Vec<f64>),
    /// Continuous regression output
    Value(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct ScoreError(pub String);

/// Deterministic scoring function over one feature row.
pub trait Scorer: Send + Sync + fmt::Debug {
    fn score(&self, row: &FeatureRow<'_>) -> Result<RawScore, ScoreError>;

    /// Per-column importance, aligned with the row's columns, if the model
    /// family exposes one.
    fn feature_importance(&self) -> Option<Vec<f64>> {
        None
    }

    /// Short family name for health output
    fn family(&self) -> &str {
        "custom"
    }
}
