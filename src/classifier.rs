//! Fitted MLP risk classifier
//!
//! A plain feed-forward network: ReLU hidden layers, a single sigmoid output
//! unit giving the probability of the positive (at-risk) class. Inference is
//! deterministic — no dropout, no sampling — and the output is clamped to
//! [0, 1] defensively even though sigmoid already respects that range.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PreverError, Result};

/// One dense layer's fitted parameters, row-major `[out][in]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub(crate) weights: Vec<Vec<f32>>,
    pub(crate) bias: Vec<f32>,
}

impl DenseLayer {
    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect()
    }
}

/// Fitted multi-layer perceptron binary classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpClassifier {
    pub(crate) layers: Vec<DenseLayer>,
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

pub(crate) fn relu(x: f32) -> f32 {
    x.max(0.0)
}

impl MlpClassifier {
    /// Initialize an untrained network with Xavier-style weights
    ///
    /// `hidden` lists the hidden layer widths; the output layer is always a
    /// single sigmoid unit. Initialization is seeded so training runs are
    /// reproducible.
    #[must_use]
    pub fn init<R: Rng>(input_dim: usize, hidden: &[usize], rng: &mut R) -> Self {
        let mut dims = vec![input_dim];
        dims.extend_from_slice(hidden);
        dims.push(1);

        let layers = dims
            .windows(2)
            .map(|w| {
                let (in_dim, out_dim) = (w[0], w[1]);
                #[allow(clippy::cast_precision_loss)]
                let limit = (6.0 / (in_dim + out_dim) as f32).sqrt();
                DenseLayer {
                    weights: (0..out_dim)
                        .map(|_| (0..in_dim).map(|_| rng.random_range(-limit..limit)).collect())
                        .collect(),
                    bias: vec![0.0; out_dim],
                }
            })
            .collect();

        Self { layers }
    }

    /// Width of the input vector this network was trained on
    #[must_use]
    pub fn input_dim(&self) -> usize {
        self.layers
            .first()
            .and_then(|l| l.weights.first())
            .map_or(0, Vec::len)
    }

    /// Hidden and output layer widths, e.g. `[64, 128, 64, 1]`
    #[must_use]
    pub fn layer_dims(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.bias.len()).collect()
    }

    /// Human-readable architecture string, e.g. `Input(11) -> Dense(64) -> Output(1)`
    #[must_use]
    pub fn architecture(&self) -> String {
        let mut parts = vec![format!("Input({})", self.input_dim())];
        let dims = self.layer_dims();
        for (i, d) in dims.iter().enumerate() {
            if i + 1 == dims.len() {
                parts.push(format!("Output({d})"));
            } else {
                parts.push(format!("Dense({d})"));
            }
        }
        parts.join(" -> ")
    }

    /// Probability of the positive class for a scaled feature vector
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the vector width disagrees with the
    /// network's input layer — artifacts loaded out of sync.
    pub fn predict_proba(&self, vector: &[f32]) -> Result<f32> {
        if vector.len() != self.input_dim() {
            return Err(PreverError::SchemaMismatch {
                expected: self.input_dim(),
                actual: vector.len(),
            });
        }
        let activations = self.forward(vector);
        let logit = activations
            .last()
            .and_then(|out| out.first())
            .copied()
            .unwrap_or(0.0);
        Ok(sigmoid(logit).clamp(0.0, 1.0))
    }

    /// Forward pass returning every layer's pre-output activations
    ///
    /// Hidden layers apply ReLU; the final entry is the raw output logit.
    /// Training needs the intermediate activations for backpropagation.
    pub(crate) fn forward(&self, input: &[f32]) -> Vec<Vec<f32>> {
        let mut activations = Vec::with_capacity(self.layers.len());
        let mut current = input.to_vec();
        let last = self.layers.len().saturating_sub(1);
        for (i, layer) in self.layers.iter().enumerate() {
            let mut z = layer.forward(&current);
            if i < last {
                for v in &mut z {
                    *v = relu(*v);
                }
            }
            current.clone_from(&z);
            activations.push(z);
        }
        activations
    }
}
