//! Training dataset loading and schema construction
//!
//! Reads the clinical CSV the offline tools consume, keeps each row in the
//! same loosely-typed form the serving pipeline uses, and derives the frozen
//! feature schema: numeric columns in dataset order, then one indicator per
//! categorical column with its lexically-first category dropped as the
//! reference. Encoding training rows through [`crate::align::align`] with
//! that schema guarantees training and serving can never disagree on column
//! meaning.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::align::align;
use crate::error::{PreverError, Result};
use crate::record::FeatureValue;
use crate::sanitize::sanitize;
use crate::schema::FeatureSchema;

/// A labeled tabular dataset in pipeline-native form
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature column names, in file order (target excluded)
    pub headers: Vec<String>,
    /// One loosely-typed feature map per row
    pub records: Vec<BTreeMap<String, FeatureValue>>,
    /// Binary target per row
    pub labels: Vec<f32>,
}

fn parse_cell(cell: &str) -> FeatureValue {
    let trimmed = cell.trim();
    match trimmed.parse::<f64>() {
        Ok(n) => FeatureValue::Number(n),
        Err(_) => FeatureValue::Text(trimmed.to_string()),
    }
}

impl Dataset {
    /// Load a headed CSV, splitting off `target` as the label column
    ///
    /// # Errors
    ///
    /// Returns `DatasetError` for unreadable files, a missing target column,
    /// ragged rows, or non-binary labels.
    pub fn from_csv(path: impl AsRef<Path>, target: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PreverError::DatasetError {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_csv_str(&content, target)
    }

    /// Parse CSV text, splitting off `target` as the label column
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::from_csv`].
    pub fn from_csv_str(content: &str, target: &str) -> Result<Self> {
        let mut lines = content.lines().filter(|l| !l.trim().is_empty());
        let header_line = lines.next().ok_or_else(|| PreverError::DatasetError {
            reason: "empty dataset".to_string(),
        })?;
        let all_headers: Vec<String> =
            header_line.split(',').map(|h| h.trim().to_string()).collect();

        let target_idx = all_headers
            .iter()
            .position(|h| h == target)
            .ok_or_else(|| PreverError::DatasetError {
                reason: format!("target column '{target}' not found"),
            })?;

        let headers: Vec<String> = all_headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target_idx)
            .map(|(_, h)| h.clone())
            .collect();

        let mut records = Vec::new();
        let mut labels = Vec::new();
        for (line_no, line) in lines.enumerate() {
            let cells: Vec<&str> = line.split(',').collect();
            if cells.len() != all_headers.len() {
                return Err(PreverError::DatasetError {
                    reason: format!(
                        "row {} has {} cells, expected {}",
                        line_no + 2,
                        cells.len(),
                        all_headers.len()
                    ),
                });
            }

            let label = cells[target_idx].trim().parse::<f32>().ok().filter(|l| {
                *l == 0.0 || *l == 1.0
            });
            let Some(label) = label else {
                return Err(PreverError::DatasetError {
                    reason: format!(
                        "row {} has non-binary label '{}'",
                        line_no + 2,
                        cells[target_idx].trim()
                    ),
                });
            };

            let mut record = BTreeMap::new();
            for (i, cell) in cells.iter().enumerate() {
                if i != target_idx {
                    record.insert(all_headers[i].clone(), parse_cell(cell));
                }
            }
            records.push(record);
            labels.push(label);
        }

        if records.is_empty() {
            return Err(PreverError::DatasetError {
                reason: "dataset has no rows".to_string(),
            });
        }

        Ok(Self {
            headers,
            records,
            labels,
        })
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows (never true once constructed)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Derive the frozen feature schema from the observed columns
    ///
    /// A column is categorical when any sanitized row holds non-numeric text
    /// in it. Categorical columns expand to sorted category indicators with
    /// the first category dropped (k−1 dummy convention); numeric columns
    /// keep their own name. Numeric columns come first, in file order, then
    /// the indicator blocks, matching the layout the training pipeline froze.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the derived schema would be empty.
    pub fn build_schema(&self) -> Result<FeatureSchema> {
        let mut categories: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for record in &self.records {
            for (name, value) in &sanitize(record) {
                if let FeatureValue::Text(s) = value {
                    if s.parse::<f64>().is_err() {
                        categories.entry(name.clone()).or_default().insert(s.clone());
                    }
                }
            }
        }

        let mut columns = Vec::new();
        for header in &self.headers {
            if !categories.contains_key(header) {
                columns.push(header.clone());
            }
        }
        for header in &self.headers {
            if let Some(cats) = categories.get(header) {
                // Drop the lexically-first category: the all-zero baseline.
                for cat in cats.iter().skip(1) {
                    columns.push(format!("{header}_{cat}"));
                }
            }
        }

        FeatureSchema::new(columns)
    }

    /// Encode every row against `schema` via the serving-path aligner
    ///
    /// # Errors
    ///
    /// Returns `MissingFeatures` if any row cannot derive a schema column —
    /// impossible for a schema built from this dataset, possible when
    /// encoding against a foreign schema during validation.
    pub fn encode(&self, schema: &FeatureSchema) -> Result<Vec<Vec<f32>>> {
        self.records
            .iter()
            .map(|record| align(schema, &sanitize(record)))
            .collect()
    }
}
