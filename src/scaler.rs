//! Feature standardization
//!
//! Per-feature rescaling using the mean/stddev pairs captured at training
//! time, so every feature reaches the classifier at comparable scale. The
//! parameters are positional: element `i` of a pair applies to column `i` of
//! the feature schema, which is why a length mismatch is treated as a
//! deployment fault rather than a user input error.

use serde::{Deserialize, Serialize};

use crate::error::{PreverError, Result};

/// Fitted per-feature standardization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl StandardScaler {
    /// Build a scaler from fitted parameters
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the mean and stddev vectors differ in
    /// length.
    pub fn new(mean: Vec<f32>, std: Vec<f32>) -> Result<Self> {
        if mean.len() != std.len() {
            return Err(PreverError::SchemaMismatch {
                expected: mean.len(),
                actual: std.len(),
            });
        }
        Ok(Self { mean, std })
    }

    /// Fit a scaler over row-major samples of uniform width
    ///
    /// # Errors
    ///
    /// Returns `DatasetError` if there are no samples or rows are ragged.
    pub fn fit(samples: &[Vec<f32>]) -> Result<Self> {
        let Some(first) = samples.first() else {
            return Err(PreverError::DatasetError {
                reason: "cannot fit scaler on empty dataset".to_string(),
            });
        };
        let width = first.len();
        if samples.iter().any(|row| row.len() != width) {
            return Err(PreverError::DatasetError {
                reason: "ragged rows in dataset".to_string(),
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let n = samples.len() as f32;
        let mut mean = vec![0.0f32; width];
        for row in samples {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = vec![0.0f32; width];
        for row in samples {
            for ((s, v), m) in var.iter_mut().zip(row).zip(&mean) {
                let d = v - m;
                *s += d * d;
            }
        }
        let std = var.into_iter().map(|s| (s / n).sqrt()).collect();

        Self::new(mean, std)
    }

    /// Number of feature positions this scaler covers
    #[must_use]
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Whether the scaler covers zero positions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Apply `scaled[i] = (v[i] - mean[i]) / std[i]` elementwise
    ///
    /// A zero stddev (constant training column) divides by 1 instead,
    /// matching the fitted library's convention.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the vector length disagrees with the
    /// stored parameter count — the artifacts were loaded out of sync.
    pub fn transform(&self, vector: &[f32]) -> Result<Vec<f32>> {
        if vector.len() != self.mean.len() {
            return Err(PreverError::SchemaMismatch {
                expected: self.mean.len(),
                actual: vector.len(),
            });
        }
        Ok(vector
            .iter()
            .zip(&self.mean)
            .zip(&self.std)
            .map(|((v, m), s)| {
                let denom = if *s == 0.0 { 1.0 } else { *s };
                (v - m) / denom
            })
            .collect())
    }
}
