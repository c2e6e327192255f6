//! Feature Projector
//!
//! Maps a validated raw attribute map onto the exact ordered vector a fitted
//! artifact expects. This is the only projection implementation; both the
//! prediction adapters and the similarity index go through it.
//!
//! ```text
//! raw map ──> select required fields ──> expand categoricals ──> reindex onto
//!             (schema order)             ({field}_{value} = 1)    expanded_columns,
//!                                                                 fill 0, drop unknown
//!                                                                        │
//!                                                                 rescale fitted columns
//! ```

use crate::schema::{indicator_column, FieldKind, SchemaSpec};
use crate::validate::{validate, ValidationOutcome};
use incidentx_core::{categorical_value, numeric_value, Error, FeatureVector, RawAttributes, Result};
use std::sync::Arc;

/// Schema-bound projector. Cheap to clone; shares the schema.
#[derive(Debug, Clone)]
pub struct FeatureProjector {
    schema: Arc<SchemaSpec>,
}

impl FeatureProjector {
    pub fn new(schema: Arc<SchemaSpec>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &SchemaSpec {
        &self.schema
    }

    pub fn shared_schema(&self) -> Arc<SchemaSpec> {
        Arc::clone(&self.schema)
    }

    pub fn columns(&self) -> &[String] {
        self.schema.expanded_columns()
    }

    pub fn validate(&self, raw: &RawAttributes) -> ValidationOutcome {
        validate(raw, &self.schema)
    }

    /// Validate, then project.
    pub fn prepare(&self, raw: &RawAttributes) -> Result<FeatureVector> {
        self.validate(raw)?;
        self.project(raw)
    }

    /// Project a raw map that has already passed [`validate`].
    ///
    /// Never fails for validated input. A field that is absent or of the wrong
    /// kind surfaces as [`Error::Scoring`], since it means the row bypassed
    /// validation.
    pub fn project(&self, raw: &RawAttributes) -> Result<FeatureVector> {
        let schema = &*self.schema;
        let mut vector = FeatureVector::zeros(schema.dim());
        let values = vector.as_mut_slice();

        for field in schema.fields() {
            let value = raw.get(&field.name).ok_or_else(|| {
                Error::Scoring(format!("cannot assemble '{}': field absent", field.name))
            })?;

            let (column, x) = match &field.kind {
                FieldKind::Numeric { .. } => {
                    let x = numeric_value(value).ok_or_else(|| {
                        Error::Scoring(format!("cannot assemble '{}': not numeric", field.name))
                    })?;
                    (field.name.clone(), x)
                }
                FieldKind::Categorical { .. } => {
                    let category = categorical_value(value).ok_or_else(|| {
                        Error::Scoring(format!("cannot assemble '{}': not a category", field.name))
                    })?;
                    (indicator_column(&field.name, category), 1.0)
                }
            };

            // Columns the artifact was not fit on are dropped
            if let Some(idx) = schema.column_index(&column) {
                values[idx] = x;
            }
        }

        for (idx, x) in values.iter_mut().enumerate() {
            if let Some(range) = schema.scaling_at(idx) {
                *x = range.apply(*x);
            }
        }

        Ok(vector)
    }
}
