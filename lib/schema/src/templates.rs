//! Built-in field declarations for the three capabilities.
//!
//! These describe the raw request contract only. The column layout always
//! comes from the fitted artifact (or, for similarity, from fitting the
//! corpus), never from a request.

use crate::schema::{indicator_column, FieldKind, FieldSpec};
use incidentx_core::Capability;

pub const INCIDENT_TYPES: [&str; 7] = [
    "fire",
    "flood",
    "violence",
    "road_accident",
    "gas_leak",
    "power_outage",
    "infrastructure_failure",
];

pub const TIMES_OF_DAY: [&str; 4] = ["morning", "afternoon", "evening", "night"];

fn flag(name: &str) -> FieldSpec {
    FieldSpec::numeric(name, Some(0.0), Some(1.0))
}

fn count(name: &str) -> FieldSpec {
    FieldSpec::numeric(name, Some(0.0), None)
}

fn ratio(name: &str) -> FieldSpec {
    FieldSpec::numeric(name, Some(0.0), Some(1.0))
}

pub fn fraud_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::categorical("incident_type", &INCIDENT_TYPES),
        FieldSpec::numeric("description_length", Some(0.0), Some(1000.0)),
        flag("has_media"),
        count("upvotes"),
        count("flags"),
        ratio("duplicate_score"),
        ratio("similarity_to_previous"),
        flag("posted_at_night"),
        count("account_age_days"),
        count("total_reports_by_user"),
        count("past_fraud_reports"),
        count("user_total_flags"),
        flag("verified_user"),
    ]
}

pub fn risk_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::categorical("incident_type", &INCIDENT_TYPES),
        FieldSpec::numeric("description_length", Some(0.0), Some(1000.0)),
        flag("has_media"),
        count("upvotes"),
        count("flags"),
        ratio("duplicate_score"),
        count("injuries_reported"),
        FieldSpec::numeric("people_involved", Some(1.0), None),
        count("distance_to_responder"),
        flag("near_sensitive_location"),
        FieldSpec::categorical("time_of_day", &TIMES_OF_DAY),
    ]
}

pub fn similarity_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::categorical("incident_type", &INCIDENT_TYPES),
        FieldSpec::categorical("time_of_day", &TIMES_OF_DAY),
        flag("has_media"),
        count("upvotes"),
        count("flags"),
        count("injuries_reported"),
        FieldSpec::numeric("people_involved", Some(1.0), None),
        count("distance_to_responder"),
        flag("near_sensitive_location"),
    ]
}

pub fn fields_for(capability: Capability) -> Vec<FieldSpec> {
    match capability {
        Capability::Fraud => fraud_fields(),
        Capability::Risk => risk_fields(),
        Capability::Similarity => similarity_fields(),
    }
}

/// Layout of a one-hot-then-passthrough column transformer: indicator
/// columns first (fields in declared order, categories sorted), then numeric
/// fields in declared order.
pub fn column_transformer_layout(fields: &[FieldSpec]) -> Vec<String> {
    let mut columns = Vec::new();
    for field in fields {
        if let FieldKind::Categorical { categories } = &field.kind {
            let mut sorted: Vec<&String> = categories.iter().collect();
            sorted.sort();
            columns.extend(sorted.into_iter().map(|c| indicator_column(&field.name, c)));
        }
    }
    columns.extend(
        fields
            .iter()
            .filter(|f| !f.is_categorical())
            .map(|f| f.name.clone()),
    );
    columns
}
