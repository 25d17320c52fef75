//! Patient record types and boundary validation
//!
//! The canonical request shape is the 11-field clinical-admission record.
//! Range and enum constraints are enforced here, at the API boundary, before
//! anything reaches the prediction pipeline. Pipeline internals never see an
//! untyped mapping from the wire; they see either a validated
//! [`PatientRecord`] or the loosely-typed [`FeatureValue`] map it lowers to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PreverError, Result};

/// Patient gender as captured at admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

impl Gender {
    /// Category label used by the feature schema's indicator columns
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// Yes/No clinical flag (insulin prescribed, diabetes medication)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    /// Flag set
    Yes,
    /// Flag not set
    No,
}

impl YesNo {
    /// Category label used by the feature schema's indicator columns
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

/// A loosely-typed feature value as it appears in a raw payload
///
/// The pipeline's map-level entry point accepts these so that sanitization
/// (sentinel replacement) can happen before any numeric interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Numeric value (integers and floats collapse to f64)
    Number(f64),
    /// Free-text value, possibly a category label or a junk sentinel
    Text(String),
    /// Boolean flag (encoded as 1.0 / 0.0)
    Bool(bool),
    /// Explicit null
    Null,
}

impl FeatureValue {
    /// Numeric view of this value, if one exists
    ///
    /// Numeric text (e.g. `"45"`) parses; category labels and nulls do not.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(s) => s.trim().parse::<f64>().ok(),
            FeatureValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FeatureValue::Null => None,
        }
    }
}

/// Validated 11-field clinical-admission patient record
///
/// The three utilization counters default to 0 when omitted; every other
/// field is required. Field names follow the training dataset's column names
/// (including the `diabetesMed` camelCase oddity) so requests and schema
/// columns line up without a translation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Patient age in years (1..=120)
    pub age: u32,
    /// Patient gender
    pub gender: Gender,
    /// Days of the index hospital stay (0..=30)
    pub time_in_hospital: u32,
    /// Lab procedures performed during the stay
    pub num_lab_procedures: u32,
    /// Distinct medications administered
    pub num_medications: u32,
    /// Outpatient visits in the preceding year
    #[serde(default)]
    pub number_outpatient: u32,
    /// Emergency visits in the preceding year
    #[serde(default)]
    pub number_emergency: u32,
    /// Inpatient visits in the preceding year
    #[serde(default)]
    pub number_inpatient: u32,
    /// Diagnoses recorded for the encounter
    pub number_diagnoses: u32,
    /// Insulin prescribed
    pub insulin: YesNo,
    /// Any diabetes medication prescribed
    #[serde(rename = "diabetesMed")]
    pub diabetes_med: YesNo,
}

/// Maximum accepted patient age
pub const MAX_AGE: u32 = 120;
/// Maximum accepted hospital stay in days
pub const MAX_TIME_IN_HOSPITAL: u32 = 30;

impl PatientRecord {
    /// Validate range constraints
    ///
    /// Enum constraints are already guaranteed by the type; counts are
    /// non-negative by construction. Only the bounded numeric ranges need
    /// checking here.
    ///
    /// # Errors
    ///
    /// Returns `PreverError::InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.age < 1 || self.age > MAX_AGE {
            return Err(PreverError::InvalidInput {
                field: "age".to_string(),
                reason: format!("must be between 1 and {MAX_AGE}, got {}", self.age),
            });
        }
        if self.time_in_hospital > MAX_TIME_IN_HOSPITAL {
            return Err(PreverError::InvalidInput {
                field: "time_in_hospital".to_string(),
                reason: format!(
                    "must be between 0 and {MAX_TIME_IN_HOSPITAL}, got {}",
                    self.time_in_hospital
                ),
            });
        }
        Ok(())
    }

    /// Lower to the loosely-typed map form the pipeline operates on
    ///
    /// Uses a `BTreeMap` so iteration order (and therefore every downstream
    /// artifact of this record) is deterministic.
    #[must_use]
    pub fn to_values(&self) -> BTreeMap<String, FeatureValue> {
        let mut values = BTreeMap::new();
        values.insert("age".to_string(), FeatureValue::Number(f64::from(self.age)));
        values.insert(
            "gender".to_string(),
            FeatureValue::Text(self.gender.as_str().to_string()),
        );
        values.insert(
            "time_in_hospital".to_string(),
            FeatureValue::Number(f64::from(self.time_in_hospital)),
        );
        values.insert(
            "num_lab_procedures".to_string(),
            FeatureValue::Number(f64::from(self.num_lab_procedures)),
        );
        values.insert(
            "num_medications".to_string(),
            FeatureValue::Number(f64::from(self.num_medications)),
        );
        values.insert(
            "number_outpatient".to_string(),
            FeatureValue::Number(f64::from(self.number_outpatient)),
        );
        values.insert(
            "number_emergency".to_string(),
            FeatureValue::Number(f64::from(self.number_emergency)),
        );
        values.insert(
            "number_inpatient".to_string(),
            FeatureValue::Number(f64::from(self.number_inpatient)),
        );
        values.insert(
            "number_diagnoses".to_string(),
            FeatureValue::Number(f64::from(self.number_diagnoses)),
        );
        values.insert(
            "insulin".to_string(),
            FeatureValue::Text(self.insulin.as_str().to_string()),
        );
        values.insert(
            "diabetesMed".to_string(),
            FeatureValue::Text(self.diabetes_med.as_str().to_string()),
        );
        values
    }
}
