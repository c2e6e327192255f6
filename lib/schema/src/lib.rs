//! # IncidentX Schema
//!
//! Feature schemas for the prediction and similarity capabilities.
//!
//! ## Overview
//!
//! Every capability (fraud, risk, similarity) owns one immutable
//! [`SchemaSpec`]: the raw fields a request must carry, their domains, and the
//! exact ordered column layout its fitted artifact was trained on.
//!
//! A request flows through one shared path:
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  raw JSON   │────>│  validate   │────>│   project   │────> FeatureVector
//! │ attributes  │     │ (first      │     │ (one-hot,   │      (len == dim)
//! └─────────────┘     │  violation) │     │  reindex,   │
//!                     └─────────────┘     │  rescale)   │
//!                                         └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use incidentx_core::Capability;
//! use incidentx_schema::{templates, FeatureProjector, SchemaSpec};
//! use std::sync::Arc;
//!
//! let fields = templates::fraud_fields();
//! let columns = templates::column_transformer_layout(&fields);
//! let spec = SchemaSpec::new(Capability::Fraud, fields, columns, vec![]).unwrap();
//! let projector = FeatureProjector::new(Arc::new(spec));
//! assert_eq!(projector.columns().len(), 19);
//! ```

pub mod fit;
pub mod projector;
pub mod registry;
pub mod schema;
pub mod templates;
pub mod validate;

pub use fit::fit_layout;
pub use projector::FeatureProjector;
pub use registry::{SchemaRegistry, SchemaRegistryBuilder};
pub use schema::{
    indicator_column,
    FieldKind,
    FieldSpec,
    MinMax,
    RescaleParams,
    SchemaError,
    SchemaSpec,
};
pub use validate::{validate, ValidationOutcome};
