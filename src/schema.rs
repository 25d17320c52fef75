//! Feature schema
//!
//! The schema is the ordered list of input-vector column names frozen at
//! training time. Every prediction must produce a vector of exactly this
//! length, in exactly this order; the schema is the single source of truth
//! for indicator-column identity during alignment.

use serde::{Deserialize, Serialize};

use crate::error::{PreverError, Result};

/// Frozen, ordered list of feature column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema from an ordered column list
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the column list is empty — a zero-width
    /// schema can never have been produced by training.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(PreverError::SchemaMismatch {
                expected: 1,
                actual: 0,
            });
        }
        Ok(Self { columns })
    }

    /// Number of columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns (never true for a constructed schema)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Ordered column names
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Owned copy of the column names, for response payloads
    #[must_use]
    pub fn column_vec(&self) -> Vec<String> {
        self.columns.clone()
    }
}
