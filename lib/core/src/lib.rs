//! # IncidentX Core
//!
//! Core types shared by every IncidentX crate.
//!
//! - [`FeatureVector`] - Dense, ordered numeric vector matching a schema's column layout
//! - [`Capability`] - The three served capabilities (fraud, risk, similarity)
//! - [`RawAttributes`] - The caller-supplied, unordered attribute map
//! - [`Error`] / [`ErrorKind`] - Failure taxonomy: validation, unavailable, scoring, internal
//!
//! ## Example
//!
//! ```rust
//! use incidentx_core::FeatureVector;
//!
//! let a = FeatureVector::new(vec![1.0, 0.0, 1.0]);
//! let b = FeatureVector::new(vec![1.0, 0.0, 1.0]);
//! assert!((a.cosine_similarity(&b) - 1.0).abs() < 1e-12);
//! ```

pub mod attributes;
pub mod capability;
pub mod error;
pub mod vector;

pub use attributes::{categorical_value, numeric_or, numeric_value, RawAttributes};
pub use capability::Capability;
pub use error::{Bound, Error, ErrorKind, Result, ValidationError};
pub use vector::{cosine_with_norms, FeatureVector};
