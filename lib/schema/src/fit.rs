//! Corpus layout fitting
//!
//! Fits the column layout and rescaling parameters of a schema over a whole
//! dataset, once. Query-time code reuses the fitted schema and never refits.

use crate::schema::{indicator_column, FieldKind, FieldSpec, MinMax, RescaleParams, SchemaError, SchemaSpec};
use incidentx_core::{categorical_value, numeric_value, Capability, RawAttributes};
use std::collections::BTreeSet;

/// Fit a dummy-encoding layout over `rows`.
///
/// Numeric fields come first in declared order, followed by one indicator
/// column per category *observed in the rows*, sorted, per categorical field.
/// Every numeric column gets min-max parameters fit over all rows.
///
/// Rows are expected to have passed validation against `fields`.
pub fn fit_layout(
    capability: Capability,
    fields: Vec<FieldSpec>,
    rows: &[RawAttributes],
) -> Result<SchemaSpec, SchemaError> {
    if rows.is_empty() {
        return Err(SchemaError::EmptyCorpus);
    }

    let mut columns = Vec::new();
    let mut rescale = Vec::new();

    for field in fields.iter().filter(|f| !f.is_categorical()) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (row_idx, row) in rows.iter().enumerate() {
            let value = row
                .get(&field.name)
                .and_then(numeric_value)
                .ok_or_else(|| SchemaError::UnfittableRow {
                    row: row_idx,
                    field: field.name.clone(),
                })?;
            min = min.min(value);
            max = max.max(value);
        }
        columns.push(field.name.clone());
        rescale.push(RescaleParams {
            column: field.name.clone(),
            range: MinMax::new(min, max),
        });
    }

    for field in &fields {
        if let FieldKind::Categorical { .. } = field.kind {
            let mut observed = BTreeSet::new();
            for (row_idx, row) in rows.iter().enumerate() {
                let value = row
                    .get(&field.name)
                    .and_then(categorical_value)
                    .ok_or_else(|| SchemaError::UnfittableRow {
                        row: row_idx,
                        field: field.name.clone(),
                    })?;
                observed.insert(value);
            }
            columns.extend(observed.into_iter().map(|c| indicator_column(&field.name, c)));
        }
    }

    SchemaSpec::new(capability, fields, columns, rescale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<RawAttributes> {
        vec![
            json!({"incident_type": "flood", "upvotes": 2, "has_media": 1}),
            json!({"incident_type": "fire", "upvotes": 10, "has_media": 1}),
            json!({"incident_type": "flood", "upvotes": 6, "has_media": 1}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::categorical("incident_type", &["fire", "flood", "violence"]),
            FieldSpec::numeric("upvotes", Some(0.0), None),
            FieldSpec::numeric("has_media", Some(0.0), Some(1.0)),
        ]
    }

    #[test]
    fn test_layout_numeric_first_then_observed_categories() {
        let spec = fit_layout(Capability::Similarity, fields(), &rows()).unwrap();
        assert_eq!(
            spec.expanded_columns(),
            &["upvotes", "has_media", "incident_type_fire", "incident_type_flood"]
        );
        // "violence" was never observed, so it has no column
        assert_eq!(spec.column_index("incident_type_violence"), None);
    }

    #[test]
    fn test_fitted_ranges() {
        let spec = fit_layout(Capability::Similarity, fields(), &rows()).unwrap();
        assert_eq!(spec.scaling_at(0), Some(MinMax::new(2.0, 10.0)));
        // constant column: degenerate range
        assert_eq!(spec.scaling_at(1), Some(MinMax::new(1.0, 1.0)));
        assert_eq!(spec.scaling_at(2), None);
    }

    #[test]
    fn test_empty_corpus_rejected() {
        assert_eq!(
            fit_layout(Capability::Similarity, fields(), &[]).unwrap_err(),
            SchemaError::EmptyCorpus
        );
    }

    #[test]
    fn test_non_numeric_row_rejected() {
        let mut rows = rows();
        rows[1].insert("upvotes".into(), json!("many"));
        assert_eq!(
            fit_layout(Capability::Similarity, fields(), &rows).unwrap_err(),
            SchemaError::UnfittableRow { row: 1, field: "upvotes".into() }
        );
    }
}
