//! # IncidentX API
//!
//! The serving boundary: an immutable [`ServiceContext`] holding every loaded
//! capability, response shapes independent of transport, health reporting and
//! a thin actix-web REST layer over all of it.

pub mod context;
pub mod error;
pub mod health;
pub mod response;
pub mod rest;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ApiError, ErrorBody};
pub use health::{CapabilityHealth, HealthReport, HealthStatus, SchemaSummary};
pub use response::{FraudResponse, Outcome, RiskResponse, SimilarityResponse};
pub use rest::{configure, RestApi};
