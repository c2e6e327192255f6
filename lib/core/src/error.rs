use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::Capability;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Model not loaded: {0}")]
    ModelUnavailable(Capability),

    #[error("Corpus not loaded")]
    CorpusUnavailable,

    #[error("Prediction error: {0}")]
    Scoring(String),

    #[error("Feature vector has {actual} columns, schema expects {expected}")]
    InternalConsistency { expected: usize, actual: usize },

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse failure class a caller can branch on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad request; fix the input, never retry as-is.
    Validation,
    /// Artifact or corpus not loaded; the service is degraded.
    Unavailable,
    /// The opaque scoring call failed for this request.
    Scoring,
    /// Projected vector disagrees with its schema.
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::UnknownCapability(_) => ErrorKind::Validation,
            Error::ModelUnavailable(_)
            | Error::CorpusUnavailable
            | Error::InvalidArtifact(_)
            | Error::Io(_)
            | Error::Serialization(_) => ErrorKind::Unavailable,
            Error::Scoring(_) => ErrorKind::Scoring,
            Error::InternalConsistency { .. } => ErrorKind::Internal,
        }
    }
}

/// The first violation found in a raw attribute map.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required features: {0:?}")]
    MissingFields(Vec<String>),

    #[error("Invalid {field}. Must be one of: {allowed:?}")]
    InvalidCategory { field: String, allowed: Vec<String> },

    #[error("{0} must be numeric")]
    TypeMismatch(String),

    #[error("{field} must be {bound}")]
    OutOfRange { field: String, bound: Bound },

    #[error("threshold must be a finite number, got {0}")]
    InvalidThreshold(f64),
}

impl ValidationError {
    /// Field the violation is about, if it concerns a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingFields(fields) => fields.first().map(String::as_str),
            ValidationError::InvalidCategory { field, .. }
            | ValidationError::OutOfRange { field, .. } => Some(field.as_str()),
            ValidationError::TypeMismatch(field) => Some(field.as_str()),
            ValidationError::InvalidThreshold(_) => None,
        }
    }
}

/// An inclusive bound that a numeric field violated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Min(f64),
    Max(f64),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Min(v) => write!(f, ">= {}", v),
            Bound::Max(v) => write!(f, "<= {}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        let missing = ValidationError::MissingFields(vec!["flags".into(), "upvotes".into()]);
        assert_eq!(missing.to_string(), "Missing required features: [\"flags\", \"upvotes\"]");

        let range = ValidationError::OutOfRange {
            field: "has_media".into(),
            bound: Bound::Max(1.0),
        };
        assert_eq!(range.to_string(), "has_media must be <= 1");

        let ty = ValidationError::TypeMismatch("upvotes".into());
        assert_eq!(ty.to_string(), "upvotes must be numeric");
    }

    #[test]
    fn test_error_kinds() {
        let validation: Error = ValidationError::TypeMismatch("flags".into()).into();
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert_eq!(Error::CorpusUnavailable.kind(), ErrorKind::Unavailable);
        assert_eq!(Error::ModelUnavailable(Capability::Fraud).kind(), ErrorKind::Unavailable);
        assert_eq!(Error::Scoring("boom".into()).kind(), ErrorKind::Scoring);
        assert_eq!(
            Error::InternalConsistency { expected: 3, actual: 2 }.kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_field_accessor() {
        let err = ValidationError::InvalidCategory {
            field: "time_of_day".into(),
            allowed: vec!["night".into()],
        };
        assert_eq!(err.field(), Some("time_of_day"));
        assert_eq!(ValidationError::InvalidThreshold(2.0).field(), None);
    }
}
