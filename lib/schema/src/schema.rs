//! Schema definitions
//!
//! A [`SchemaSpec`] pins down the input contract of one fitted artifact:
//! which raw fields are required, what values they may take, and the exact
//! ordered column layout (post one-hot, pre-scaling) the artifact was fit on,
//! together with the fitted rescaling parameters.
//!
//! Specs are checked once at construction and immutable afterwards.

use ahash::{AHashMap, AHashSet};
use incidentx_core::{Capability, Error};
use serde::{Deserialize, Serialize};

/// Declared constraints for one required raw field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    pub name: String,

    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Numeric field with optional inclusive bounds
    pub fn numeric(name: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Numeric { min, max },
        }
    }

    /// Categorical field accepting exactly the given values
    pub fn categorical<S: AsRef<str>>(name: impl Into<String>, categories: &[S]) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Categorical {
                categories: categories.iter().map(|c| c.as_ref().to_string()).collect(),
            },
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Categorical { .. })
    }

    /// Accepted values, for categorical fields
    pub fn categories(&self) -> Option<&[String]> {
        match &self.kind {
            FieldKind::Categorical { categories } => Some(categories),
            FieldKind::Numeric { .. } => None,
        }
    }
}

/// Value class of a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// Numeric (booleans read as 0/1), inclusive bounds, either may be absent
    Numeric {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Finite set of accepted strings
    Categorical { categories: Vec<String> },
}

/// Fitted min-max parameters for one expanded column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Affine map onto [0, 1] over the fitted range.
    ///
    /// Values outside the fitted range are not clamped and may land outside
    /// [0, 1]. A degenerate range (`min == max`) maps every input to 0.
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            0.0
        } else {
            (x - self.min) / range
        }
    }
}

/// Rescaling entry: which column, which fitted range
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RescaleParams {
    pub column: String,
    #[serde(flatten)]
    pub range: MinMax,
}

/// Immutable input contract of one capability's artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaSpecDef", into = "SchemaSpecDef")]
pub struct SchemaSpec {
    capability: Capability,
    fields: Vec<FieldSpec>,
    expanded_columns: Vec<String>,
    rescale: Vec<RescaleParams>,
    column_index: AHashMap<String, usize>,
    column_scaling: Vec<Option<MinMax>>,
}

/// Wire form of [`SchemaSpec`]; every deserialized spec goes through
/// [`SchemaSpec::new`] checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSpecDef {
    pub capability: Capability,
    pub fields: Vec<FieldSpec>,
    pub expanded_columns: Vec<String>,
    #[serde(default)]
    pub rescale: Vec<RescaleParams>,
}

impl TryFrom<SchemaSpecDef> for SchemaSpec {
    type Error = SchemaError;

    fn try_from(def: SchemaSpecDef) -> Result<Self, Self::Error> {
        SchemaSpec::new(def.capability, def.fields, def.expanded_columns, def.rescale)
    }
}

impl From<SchemaSpec> for SchemaSpecDef {
    fn from(spec: SchemaSpec) -> Self {
        Self {
            capability: spec.capability,
            fields: spec.fields,
            expanded_columns: spec.expanded_columns,
            rescale: spec.rescale,
        }
    }
}

impl PartialEq for SchemaSpec {
    fn eq(&self, other: &Self) -> bool {
        self.capability == other.capability
            && self.fields == other.fields
            && self.expanded_columns == other.expanded_columns
            && self.rescale == other.rescale
    }
}

impl SchemaSpec {
    /// Build and check a schema.
    ///
    /// Every expanded column must be either a numeric field's name or a
    /// `{field}_{category}` indicator for a declared category; every rescaled
    /// column must exist in the layout.
    pub fn new(
        capability: Capability,
        fields: Vec<FieldSpec>,
        expanded_columns: Vec<String>,
        rescale: Vec<RescaleParams>,
    ) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let mut seen_fields = AHashSet::new();
        for field in &fields {
            if !seen_fields.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            match &field.kind {
                FieldKind::Numeric { min: Some(min), max: Some(max) } if min > max => {
                    return Err(SchemaError::InvalidBounds(field.name.clone()));
                }
                FieldKind::Categorical { categories } if categories.is_empty() => {
                    return Err(SchemaError::EmptyDomain(field.name.clone()));
                }
                _ => {}
            }
        }

        if expanded_columns.is_empty() {
            return Err(SchemaError::EmptyLayout);
        }

        let mut column_index = AHashMap::with_capacity(expanded_columns.len());
        for (idx, column) in expanded_columns.iter().enumerate() {
            if column_index.insert(column.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
            if !column_is_mapped(column, &fields) {
                return Err(SchemaError::UnmappedColumn(column.clone()));
            }
        }

        let mut column_scaling = vec![None; expanded_columns.len()];
        for params in &rescale {
            let idx = *column_index
                .get(&params.column)
                .ok_or_else(|| SchemaError::UnknownRescaleColumn(params.column.clone()))?;
            let MinMax { min, max } = params.range;
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(SchemaError::InvalidRescale(params.column.clone()));
            }
            if column_scaling[idx].replace(params.range).is_some() {
                return Err(SchemaError::DuplicateColumn(params.column.clone()));
            }
        }

        Ok(Self {
            capability,
            fields,
            expanded_columns,
            rescale,
            column_index,
            column_scaling,
        })
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Required raw fields in canonical order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The artifact's column layout, fixed at fit time
    pub fn expanded_columns(&self) -> &[String] {
        &self.expanded_columns
    }

    pub fn dim(&self) -> usize {
        self.expanded_columns.len()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.column_index.get(column).copied()
    }

    pub fn rescale(&self) -> &[RescaleParams] {
        &self.rescale
    }

    /// Fitted range for the column at `idx`, if it is rescaled
    #[inline]
    pub fn scaling_at(&self, idx: usize) -> Option<MinMax> {
        self.column_scaling.get(idx).copied().flatten()
    }
}

/// Indicator column name for a categorical value
#[inline]
pub fn indicator_column(field: &str, category: &str) -> String {
    format!("{}_{}", field, category)
}

fn column_is_mapped(column: &str, fields: &[FieldSpec]) -> bool {
    fields.iter().any(|field| match &field.kind {
        FieldKind::Numeric { .. } => field.name == column,
        FieldKind::Categorical { categories } => column
            .strip_prefix(field.name.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
            .map(|category| categories.iter().any(|c| c == category))
            .unwrap_or(false),
    })
}

/// Errors raised while building or fitting a schema
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema cannot be empty")]
    EmptySchema,

    #[error("Schema has no expanded columns")]
    EmptyLayout,

    #[error("Field '{0}' declared twice")]
    DuplicateField(String),

    #[error("Column '{0}' declared twice")]
    DuplicateColumn(String),

    #[error("Field '{0}' has min greater than max")]
    InvalidBounds(String),

    #[error("Categorical field '{0}' has no categories")]
    EmptyDomain(String),

    #[error("Column '{0}' does not map to any declared field or category")]
    UnmappedColumn(String),

    #[error("Rescale column '{0}' is not in the layout")]
    UnknownRescaleColumn(String),

    #[error("Rescale column '{0}' has an invalid fitted range")]
    InvalidRescale(String),

    #[error("Capability '{0}' registered twice")]
    DuplicateCapability(Capability),

    #[error("Cannot fit a layout over an empty corpus")]
    EmptyCorpus,

    #[error("Row {row}: field '{field}' cannot be fit")]
    UnfittableRow { row: usize, field: String },
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::InvalidArtifact(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::categorical("incident_type", &["fire", "flood"]),
            FieldSpec::numeric("upvotes", Some(0.0), None),
        ]
    }

    fn columns() -> Vec<String> {
        vec!["incident_type_fire".into(), "incident_type_flood".into(), "upvotes".into()]
    }

    #[test]
    fn test_schema_creation() {
        let spec = SchemaSpec::new(Capability::Fraud, fields(), columns(), vec![]).unwrap();
        assert_eq!(spec.dim(), 3);
        assert_eq!(spec.column_index("upvotes"), Some(2));
        assert_eq!(spec.required_fields().collect::<Vec<_>>(), vec!["incident_type", "upvotes"]);
        assert!(spec.scaling_at(2).is_none());
    }

    #[test]
    fn test_unmapped_column_rejected() {
        let mut cols = columns();
        cols.push("incident_type_earthquake".into());
        assert_eq!(
            SchemaSpec::new(Capability::Fraud, fields(), cols, vec![]),
            Err(SchemaError::UnmappedColumn("incident_type_earthquake".into()))
        );
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut cols = columns();
        cols.push("upvotes".into());
        assert!(matches!(
            SchemaSpec::new(Capability::Fraud, fields(), cols, vec![]),
            Err(SchemaError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_rescale_column_must_exist() {
        let rescale = vec![RescaleParams {
            column: "flags".into(),
            range: MinMax::new(0.0, 4.0),
        }];
        assert!(matches!(
            SchemaSpec::new(Capability::Fraud, fields(), columns(), rescale),
            Err(SchemaError::UnknownRescaleColumn(_))
        ));
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let bad = vec![FieldSpec::numeric("upvotes", Some(5.0), Some(1.0))];
        assert!(matches!(
            SchemaSpec::new(Capability::Risk, bad, vec!["upvotes".into()], vec![]),
            Err(SchemaError::InvalidBounds(_))
        ));
    }

    #[test]
    fn test_min_max_boundaries() {
        let range = MinMax::new(2.0, 6.0);
        assert_eq!(range.apply(2.0), 0.0);
        assert_eq!(range.apply(6.0), 1.0);
        assert_eq!(range.apply(4.0), 0.5);
    }

    #[test]
    fn test_min_max_out_of_range_is_not_clamped() {
        let range = MinMax::new(0.0, 10.0);
        assert_eq!(range.apply(20.0), 2.0);
        assert_eq!(range.apply(-5.0), -0.5);
    }

    #[test]
    fn test_min_max_degenerate_range() {
        let range = MinMax::new(3.0, 3.0);
        assert_eq!(range.apply(3.0), 0.0);
        assert_eq!(range.apply(1.0), 0.0);
        assert_eq!(range.apply(10.0), 0.0);
        assert_eq!(range.apply(-250.0), 0.0);
    }

    #[test]
    fn test_serde_roundtrip_rechecks() {
        let rescale = vec![RescaleParams {
            column: "upvotes".into(),
            range: MinMax::new(0.0, 20.0),
        }];
        let spec = SchemaSpec::new(Capability::Similarity, fields(), columns(), rescale).unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        let parsed: SchemaSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, parsed);
        assert_eq!(parsed.scaling_at(2), Some(MinMax::new(0.0, 20.0)));

        let broken = json.replace("incident_type_flood", "incident_type_hail");
        assert!(serde_json::from_str::<SchemaSpec>(&broken).is_err());
    }

    #[test]
    fn test_field_spec_wire_format() {
        let json = serde_json::to_value(FieldSpec::numeric("has_media", Some(0.0), Some(1.0))).unwrap();
        assert_eq!(json, serde_json::json!({"name": "has_media", "type": "numeric", "min": 0.0, "max": 1.0}));

        let parsed: FieldSpec =
            serde_json::from_value(serde_json::json!({"name": "upvotes", "type": "numeric", "min": 0})).unwrap();
        assert_eq!(parsed, FieldSpec::numeric("upvotes", Some(0.0), None));
    }
}
