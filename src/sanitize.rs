//! Input sanitization
//!
//! Frontends send junk: nulls, empty strings, and the sentinel strings the
//! original dataset used for missing values ("?", "NA", "None"). Sanitization
//! replaces those with a safe default before any numeric interpretation
//! happens. Non-sentinel values pass through unchanged, keeping their
//! original type; keys that are absent stay absent (filling them is the
//! aligner's job, which knows which columns the schema actually requires).

use std::collections::BTreeMap;

use crate::record::FeatureValue;

/// Sentinel strings treated as missing values
const SENTINELS: [&str; 3] = ["?", "NA", "None"];

/// Replace a null or sentinel value with `default`
///
/// Text is trimmed before the sentinel check; trimmed non-sentinel text is
/// passed through (the original pipeline stripped whitespace the same way).
#[must_use]
pub fn clean_value(value: &FeatureValue, default: f64) -> FeatureValue {
    match value {
        FeatureValue::Null => FeatureValue::Number(default),
        FeatureValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || SENTINELS.contains(&trimmed) {
                FeatureValue::Number(default)
            } else {
                FeatureValue::Text(trimmed.to_string())
            }
        }
        other => other.clone(),
    }
}

/// Sanitize every value in a raw feature map, defaulting sentinels to 0
///
/// Never fails and has no side effects; the key set of the output equals the
/// key set of the input.
#[must_use]
pub fn sanitize(values: &BTreeMap<String, FeatureValue>) -> BTreeMap<String, FeatureValue> {
    values
        .iter()
        .map(|(k, v)| (k.clone(), clean_value(v, 0.0)))
        .collect()
}
