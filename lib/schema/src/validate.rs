//! Input validation
//!
//! Checks run in a fixed order and the first violation wins:
//!
//! 1. every required field is present (all missing fields are reported together)
//! 2. every categorical field holds a declared category
//! 3. every numeric field is numeric and within its inclusive bounds

use crate::schema::{FieldKind, SchemaSpec};
use incidentx_core::{categorical_value, numeric_value, Bound, RawAttributes, ValidationError};

/// `Ok(())` when valid, otherwise the first violation
pub type ValidationOutcome = Result<(), ValidationError>;

pub fn validate(raw: &RawAttributes, schema: &SchemaSpec) -> ValidationOutcome {
    let missing: Vec<String> = schema
        .required_fields()
        .filter(|name| !raw.contains_key(*name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    for field in schema.fields() {
        if let FieldKind::Categorical { categories } = &field.kind {
            let accepted = raw
                .get(&field.name)
                .and_then(categorical_value)
                .map(|value| categories.iter().any(|c| c == value))
                .unwrap_or(false);
            if !accepted {
                return Err(ValidationError::InvalidCategory {
                    field: field.name.clone(),
                    allowed: categories.clone(),
                });
            }
        }
    }

    for field in schema.fields() {
        if let FieldKind::Numeric { min, max } = &field.kind {
            let value = raw
                .get(&field.name)
                .and_then(numeric_value)
                .ok_or_else(|| ValidationError::TypeMismatch(field.name.clone()))?;
            if let Some(min) = *min {
                if value < min {
                    return Err(ValidationError::OutOfRange {
                        field: field.name.clone(),
                        bound: Bound::Min(min),
                    });
                }
            }
            if let Some(max) = *max {
                if value > max {
                    return Err(ValidationError::OutOfRange {
                        field: field.name.clone(),
                        bound: Bound::Max(max),
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use incidentx_core::Capability;
    use serde_json::json;

    fn schema() -> SchemaSpec {
        let fields = vec![
            FieldSpec::categorical("incident_type", &["fire", "flood"]),
            FieldSpec::numeric("has_media", Some(0.0), Some(1.0)),
            FieldSpec::numeric("people_involved", Some(1.0), None),
        ];
        let columns = vec![
            "incident_type_fire".into(),
            "incident_type_flood".into(),
            "has_media".into(),
            "people_involved".into(),
        ];
        SchemaSpec::new(Capability::Risk, fields, columns, vec![]).unwrap()
    }

    fn raw(value: serde_json::Value) -> RawAttributes {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_valid_input() {
        let input = raw(json!({"incident_type": "fire", "has_media": 1, "people_involved": 3}));
        assert_eq!(validate(&input, &schema()), Ok(()));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let input = raw(json!({
            "incident_type": "fire", "has_media": 0, "people_involved": 1, "reporter": "anon"
        }));
        assert!(validate(&input, &schema()).is_ok());
    }

    #[test]
    fn test_missing_fields_in_schema_order() {
        let input = raw(json!({"has_media": 1}));
        assert_eq!(
            validate(&input, &schema()),
            Err(ValidationError::MissingFields(vec![
                "incident_type".into(),
                "people_involved".into()
            ]))
        );
    }

    #[test]
    fn test_missing_wins_over_out_of_range() {
        let input = raw(json!({"incident_type": "fire", "has_media": 7}));
        assert!(matches!(
            validate(&input, &schema()),
            Err(ValidationError::MissingFields(_))
        ));
    }

    #[test]
    fn test_category_checked_before_numeric() {
        let input = raw(json!({"incident_type": "hail", "has_media": "yes", "people_involved": 0}));
        assert_eq!(
            validate(&input, &schema()),
            Err(ValidationError::InvalidCategory {
                field: "incident_type".into(),
                allowed: vec!["fire".into(), "flood".into()],
            })
        );
    }

    #[test]
    fn test_non_string_category_rejected() {
        let input = raw(json!({"incident_type": 3, "has_media": 1, "people_involved": 1}));
        assert!(matches!(
            validate(&input, &schema()),
            Err(ValidationError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn test_string_number_is_type_mismatch() {
        let input = raw(json!({"incident_type": "flood", "has_media": "1", "people_involved": 2}));
        assert_eq!(
            validate(&input, &schema()),
            Err(ValidationError::TypeMismatch("has_media".into()))
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let at_bounds = raw(json!({"incident_type": "flood", "has_media": 1, "people_involved": 1}));
        assert!(validate(&at_bounds, &schema()).is_ok());

        let below = raw(json!({"incident_type": "flood", "has_media": 0, "people_involved": 0}));
        assert_eq!(
            validate(&below, &schema()),
            Err(ValidationError::OutOfRange {
                field: "people_involved".into(),
                bound: Bound::Min(1.0)
            })
        );

        let above = raw(json!({"incident_type": "flood", "has_media": 1.5, "people_involved": 2}));
        assert_eq!(
            validate(&above, &schema()).unwrap_err().to_string(),
            "has_media must be <= 1"
        );
    }

    #[test]
    fn test_booleans_read_as_numeric() {
        let input = raw(json!({"incident_type": "fire", "has_media": true, "people_involved": 2}));
        assert!(validate(&input, &schema()).is_ok());
    }
}
