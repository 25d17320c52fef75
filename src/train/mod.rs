//! Offline training and validation
//!
//! Fits the full artifact bundle from a labeled CSV: derive the schema,
//! encode rows through the serving-path aligner, fit the scaler on the
//! training split, then train the MLP with per-sample gradient descent on
//! binary cross-entropy. Every random choice (shuffle, weight init) is
//! seeded, so a training run is reproducible end to end. The resulting
//! bundle is exactly what `serve` loads; there is no separate export step.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactBundle;
use crate::classifier::MlpClassifier;
use crate::error::{PreverError, Result};
use crate::scaler::StandardScaler;

mod data;

pub use data::Dataset;

/// Training hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Hidden layer widths
    pub hidden: Vec<usize>,
    /// Full passes over the training split
    pub epochs: usize,
    /// Gradient descent step size
    pub learning_rate: f32,
    /// Fraction of rows held out for evaluation
    pub test_fraction: f32,
    /// Seed for shuffling and weight initialization
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            hidden: vec![64, 128, 64],
            epochs: 200,
            learning_rate: 0.01,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Held-out evaluation metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// Rows evaluated
    pub samples: usize,
    /// Fraction classified correctly at the 0.5 threshold
    pub accuracy: f32,
    /// True positives over predicted positives (1 when none predicted)
    pub precision: f32,
    /// True positives over actual positives (1 when none present)
    pub recall: f32,
}

/// Fit scaler and classifier from a dataset, returning the servable bundle
/// and metrics over the held-out split
///
/// # Errors
///
/// Returns `DatasetError` for unusable data and propagates any artifact
/// consistency failure (which would indicate a bug in schema derivation).
pub fn fit(dataset: &Dataset, config: &TrainConfig) -> Result<(ArtifactBundle, EvalReport)> {
    let schema = dataset.build_schema()?;
    let rows = dataset.encode(&schema)?;

    let mut indices: Vec<usize> = (0..rows.len()).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let test_len = ((rows.len() as f32) * config.test_fraction).round() as usize;
    let test_len = test_len.min(rows.len().saturating_sub(1));
    let (test_idx, train_idx) = indices.split_at(test_len);
    if train_idx.is_empty() {
        return Err(PreverError::DatasetError {
            reason: "not enough rows to train".to_string(),
        });
    }

    let train_rows: Vec<Vec<f32>> = train_idx.iter().map(|&i| rows[i].clone()).collect();
    let scaler = StandardScaler::fit(&train_rows)?;

    let mut classifier = MlpClassifier::init(schema.len(), &config.hidden, &mut rng);
    for _ in 0..config.epochs {
        for &i in train_idx {
            let scaled = scaler.transform(&rows[i])?;
            sgd_step(&mut classifier, &scaled, dataset.labels[i], config.learning_rate);
        }
    }

    let report = evaluate_indices(&classifier, &scaler, &rows, &dataset.labels, test_idx)?;
    let bundle = ArtifactBundle::new(schema, scaler, classifier)?;
    Ok((bundle, report))
}

/// Score a bundle against a labeled dataset (the `validate` command)
///
/// # Errors
///
/// Returns `MissingFeatures` if the dataset cannot be encoded against the
/// bundle's schema, or a scaling/inference fault for inconsistent artifacts.
pub fn evaluate(bundle: &ArtifactBundle, dataset: &Dataset) -> Result<EvalReport> {
    let rows = dataset.encode(&bundle.schema)?;
    let indices: Vec<usize> = (0..rows.len()).collect();
    evaluate_indices(
        &bundle.classifier,
        &bundle.scaler,
        &rows,
        &dataset.labels,
        &indices,
    )
}

fn evaluate_indices(
    classifier: &MlpClassifier,
    scaler: &StandardScaler,
    rows: &[Vec<f32>],
    labels: &[f32],
    indices: &[usize],
) -> Result<EvalReport> {
    let mut correct = 0usize;
    let mut true_pos = 0usize;
    let mut pred_pos = 0usize;
    let mut actual_pos = 0usize;

    for &i in indices {
        let scaled = scaler.transform(&rows[i])?;
        let probability = classifier.predict_proba(&scaled)?;
        let predicted = probability >= 0.5;
        let actual = labels[i] >= 0.5;
        if predicted == actual {
            correct += 1;
        }
        if predicted {
            pred_pos += 1;
        }
        if actual {
            actual_pos += 1;
        }
        if predicted && actual {
            true_pos += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let ratio = |num: usize, den: usize| {
        if den == 0 {
            1.0
        } else {
            num as f32 / den as f32
        }
    };

    Ok(EvalReport {
        samples: indices.len(),
        accuracy: ratio(correct, indices.len()),
        precision: ratio(true_pos, pred_pos),
        recall: ratio(true_pos, actual_pos),
    })
}

/// One per-sample gradient-descent step on binary cross-entropy
///
/// With a sigmoid output, dL/dlogit reduces to `p - y`; hidden deltas
/// propagate through the ReLU mask (post-activation > 0).
fn sgd_step(classifier: &mut MlpClassifier, input: &[f32], label: f32, lr: f32) {
    let activations = classifier.forward(input);
    let num_layers = classifier.layers.len();

    let logit = activations
        .last()
        .and_then(|out| out.first())
        .copied()
        .unwrap_or(0.0);
    let p = 1.0 / (1.0 + (-logit).exp());
    let mut delta = vec![p - label];

    for layer_idx in (0..num_layers).rev() {
        let layer_input: &[f32] = if layer_idx == 0 {
            input
        } else {
            &activations[layer_idx - 1]
        };

        // Delta for the layer below, computed against current weights
        // before they are updated.
        let prev_delta: Option<Vec<f32>> = (layer_idx > 0).then(|| {
            let below = &activations[layer_idx - 1];
            (0..layer_input.len())
                .map(|k| {
                    let mask = if below[k] > 0.0 { 1.0 } else { 0.0 };
                    let sum: f32 = classifier.layers[layer_idx]
                        .weights
                        .iter()
                        .zip(&delta)
                        .map(|(row, d)| row[k] * d)
                        .sum();
                    sum * mask
                })
                .collect()
        });

        let layer = &mut classifier.layers[layer_idx];
        for (row, d) in layer.weights.iter_mut().zip(&delta) {
            for (w, x) in row.iter_mut().zip(layer_input) {
                *w -= lr * d * x;
            }
        }
        for (b, d) in layer.bias.iter_mut().zip(&delta) {
            *b -= lr * d;
        }

        if let Some(prev) = prev_delta {
            delta = prev;
        }
    }
}
