//! Feature alignment
//!
//! Converts a sanitized feature map into the fixed-width numeric vector the
//! classifier was trained on. Indicator-column identity is derived solely
//! from the schema's stored column names (`<field>_<Category>`), never by
//! re-running one-hot expansion over whatever categories the current record
//! happens to contain — encoding a single record in isolation would silently
//! shift column meaning whenever a category is absent.
//!
//! Encoding rules, per schema column in schema order:
//! - A column whose name is a key in the record takes the record's numeric
//!   value (numeric text parses; non-numeric text for a numeric column
//!   contributes 0, matching the training pipeline's reindex behavior).
//! - A column of the form `<field>_<Category>` where `<field>` is a key in
//!   the record encodes 1 when the record's text value equals `Category`,
//!   else 0. A category never seen at training time therefore encodes as
//!   all-zero indicators: the implicit reference category of the k−1 dummy
//!   convention.
//! - A column with no corresponding record key in either form is underivable;
//!   all such columns are collected and reported, never guessed.

use std::collections::BTreeMap;

use crate::error::{PreverError, Result};
use crate::record::FeatureValue;
use crate::schema::FeatureSchema;

/// Align a sanitized feature map to the schema, producing the model input
///
/// Output length always equals `schema.len()`; for identical input and
/// schema the output is bit-identical across calls and process restarts.
///
/// # Errors
///
/// Returns `MissingFeatures` naming every schema column that cannot be
/// derived from the record.
pub fn align(
    schema: &FeatureSchema,
    values: &BTreeMap<String, FeatureValue>,
) -> Result<Vec<f32>> {
    let mut vector = Vec::with_capacity(schema.len());
    let mut missing = Vec::new();

    for column in schema.columns() {
        match derive_column(column, values) {
            Some(v) => vector.push(v),
            None => missing.push(column.clone()),
        }
    }

    if missing.is_empty() {
        Ok(vector)
    } else {
        Err(PreverError::MissingFeatures { features: missing })
    }
}

/// Derive one schema column's value from the record, or None if underivable
fn derive_column(column: &str, values: &BTreeMap<String, FeatureValue>) -> Option<f32> {
    // Direct numeric column
    if let Some(value) = values.get(column) {
        #[allow(clippy::cast_possible_truncation)]
        return Some(value.as_number().unwrap_or(0.0) as f32);
    }

    // Indicator column: split at each underscore, longest field prefix first,
    // so `physical_activity_light` resolves against a `physical_activity` key
    // before a hypothetical `physical` key.
    let mut split = column.len();
    while let Some(idx) = column[..split].rfind('_') {
        split = idx;
        let (field, category) = (&column[..idx], &column[idx + 1..]);
        if let Some(value) = values.get(field) {
            let hit = match value {
                FeatureValue::Text(s) => s == category,
                // Field present but not categorical here (e.g. sanitized
                // sentinel became 0): indicator is simply off.
                _ => false,
            };
            return Some(if hit { 1.0 } else { 0.0 });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(
            [
                "age",
                "time_in_hospital",
                "number_diagnoses",
                "gender_Male",
                "insulin_Yes",
                "diabetesMed_Yes",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        )
        .expect("schema")
    }

    fn values() -> BTreeMap<String, FeatureValue> {
        let mut v = BTreeMap::new();
        v.insert("age".to_string(), FeatureValue::Number(45.0));
        v.insert("time_in_hospital".to_string(), FeatureValue::Number(2.0));
        v.insert("number_diagnoses".to_string(), FeatureValue::Number(3.0));
        v.insert("gender".to_string(), FeatureValue::Text("Male".to_string()));
        v.insert("insulin".to_string(), FeatureValue::Text("No".to_string()));
        v.insert(
            "diabetesMed".to_string(),
            FeatureValue::Text("Yes".to_string()),
        );
        v
    }

    #[test]
    fn test_align_basic() {
        let vector = align(&schema(), &values()).expect("align");
        assert_eq!(vector, vec![45.0, 2.0, 3.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_align_length_equals_schema() {
        let vector = align(&schema(), &values()).expect("align");
        assert_eq!(vector.len(), schema().len());
    }

    #[test]
    fn test_unseen_category_encodes_all_zero() {
        let mut v = values();
        v.insert(
            "gender".to_string(),
            FeatureValue::Text("Nonbinary".to_string()),
        );
        let vector = align(&schema(), &v).expect("align");
        // gender_Male indicator off, nothing else disturbed
        assert_eq!(vector[3], 0.0);
        assert_eq!(vector[0], 45.0);
    }

    #[test]
    fn test_missing_field_reported_by_name() {
        let mut v = values();
        v.remove("insulin");
        let err = align(&schema(), &v).unwrap_err();
        match err {
            PreverError::MissingFeatures { features } => {
                assert_eq!(features, vec!["insulin_Yes".to_string()]);
            }
            other => panic!("expected MissingFeatures, got {other:?}"),
        }
    }

    #[test]
    fn test_all_missing_reports_full_schema() {
        let err = align(&schema(), &BTreeMap::new()).unwrap_err();
        match err {
            PreverError::MissingFeatures { features } => {
                assert_eq!(features, schema().column_vec());
            }
            other => panic!("expected MissingFeatures, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_text_parses() {
        let mut v = values();
        v.insert("age".to_string(), FeatureValue::Text("45".to_string()));
        let vector = align(&schema(), &v).expect("align");
        assert_eq!(vector[0], 45.0);
    }

    #[test]
    fn test_non_numeric_text_in_numeric_column_contributes_zero() {
        let mut v = values();
        v.insert("age".to_string(), FeatureValue::Text("young".to_string()));
        let vector = align(&schema(), &v).expect("align");
        assert_eq!(vector[0], 0.0);
    }

    #[test]
    fn test_sanitized_sentinel_turns_indicators_off() {
        let mut v = values();
        // The sanitizer replaces "?" with Number(0.0); the indicator for a
        // numeric value is off, not an error.
        v.insert("insulin".to_string(), FeatureValue::Number(0.0));
        let vector = align(&schema(), &v).expect("align");
        assert_eq!(vector[4], 0.0);
    }

    #[test]
    fn test_longest_field_prefix_wins() {
        let schema = FeatureSchema::new(vec!["physical_activity_light".to_string()])
            .expect("schema");
        let mut v = BTreeMap::new();
        v.insert(
            "physical_activity".to_string(),
            FeatureValue::Text("light".to_string()),
        );
        let vector = align(&schema, &v).expect("align");
        assert_eq!(vector, vec![1.0]);
    }

    #[test]
    fn test_determinism() {
        let a = align(&schema(), &values()).expect("align");
        let b = align(&schema(), &values()).expect("align");
        assert_eq!(a, b);
    }
}
