//! Dataset statistics over the loaded corpus.

use incidentx_core::{categorical_value, numeric_value, RawAttributes};
use incidentx_schema::{FieldKind, FieldSpec};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub mean: f64,
    /// Sample standard deviation (n - 1); absent below two values
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_incidents: usize,
    /// Per categorical field, count per observed category
    pub categories: BTreeMap<String, BTreeMap<String, usize>>,
    pub numeric: BTreeMap<String, NumericSummary>,
}

impl DatasetStats {
    pub fn compute(fields: &[FieldSpec], rows: &[RawAttributes]) -> Self {
        let mut categories = BTreeMap::new();
        let mut numeric = BTreeMap::new();

        for field in fields {
            match &field.kind {
                FieldKind::Categorical { .. } => {
                    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
                    for value in rows.iter().filter_map(|r| r.get(&field.name).and_then(categorical_value)) {
                        *counts.entry(value.to_string()).or_default() += 1;
                    }
                    categories.insert(field.name.clone(), counts);
                }
                FieldKind::Numeric { .. } => {
                    let values: Vec<f64> = rows
                        .iter()
                        .filter_map(|r| r.get(&field.name).and_then(numeric_value))
                        .collect();
                    if let Some(summary) = summarize(&values) {
                        numeric.insert(field.name.clone(), summary);
                    }
                }
            }
        }

        Self {
            total_incidents: rows.len(),
            categories,
            numeric,
        }
    }
}

fn summarize(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.len() > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    });
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(NumericSummary { mean, std, min, max })
}
