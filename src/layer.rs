use rand::Rng;

use crate::activation::sigmoid;
use crate::{Error, Result};

/// Half-width of the uniform range used for fresh weights and biases.
pub const INIT_RANGE: f64 = 0.2;

/// A fully-connected sigmoid layer plus its momentum store.
#[derive(Debug, Clone)]
pub struct Layer {
    in_dim: usize,
    out_dim: usize,
    /// Row-major matrix with shape (out_dim, in_dim).
    weights: Vec<f64>,
    biases: Vec<f64>,
    /// Last applied weight change, shaped like `weights`.
    changes: Vec<f64>,
}

impl Layer {
    /// A layer with weights and biases drawn uniformly from `[-0.2, 0.2]`.
    pub fn new_with_rng<R: Rng + ?Sized>(in_dim: usize, out_dim: usize, rng: &mut R) -> Self {
        let weights = (0..in_dim * out_dim)
            .map(|_| rng.random_range(-INIT_RANGE..=INIT_RANGE))
            .collect();
        let biases = (0..out_dim)
            .map(|_| rng.random_range(-INIT_RANGE..=INIT_RANGE))
            .collect();
        Self {
            in_dim,
            out_dim,
            weights,
            biases,
            changes: vec![0.0; in_dim * out_dim],
        }
    }

    /// Build a layer from explicit parameters (momentum store zeroed).
    pub fn from_parts(
        in_dim: usize,
        out_dim: usize,
        weights: Vec<f64>,
        biases: Vec<f64>,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::InvalidConfig(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }
        if weights.len() != in_dim * out_dim {
            return Err(Error::InvalidShape(format!(
                "weights length {} does not match out_dim * in_dim ({out_dim} * {in_dim})",
                weights.len()
            )));
        }
        if biases.len() != out_dim {
            return Err(Error::InvalidShape(format!(
                "biases length {} does not match out_dim {out_dim}",
                biases.len()
            )));
        }
        if weights.iter().chain(&biases).any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(
                "layer parameters must be finite".to_owned(),
            ));
        }

        Ok(Self {
            in_dim,
            out_dim,
            weights,
            biases,
            changes: vec![0.0; in_dim * out_dim],
        })
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    #[inline]
    pub fn biases_mut(&mut self) -> &mut [f64] {
        &mut self.biases
    }

    /// Incoming weights of unit `unit` (shape: `(in_dim,)`).
    #[inline]
    pub fn row(&self, unit: usize) -> &[f64] {
        let start = unit * self.in_dim;
        &self.weights[start..start + self.in_dim]
    }

    /// The momentum store (shape: `(out_dim, in_dim)`, row-major).
    #[inline]
    pub fn changes(&self) -> &[f64] {
        &self.changes
    }

    #[inline]
    pub fn reset_changes(&mut self) {
        self.changes.fill(0.0);
    }

    /// Forward pass: `outputs[j] = sigmoid(b[j] + Σ_k w[j][k] * inputs[k])`.
    ///
    /// Shape contract:
    /// - `inputs.len() == self.in_dim`
    /// - `outputs.len() == self.out_dim`
    #[inline]
    pub fn forward(&self, inputs: &[f64], outputs: &mut [f64]) {
        dense_sigmoid(&self.weights, &self.biases, self.in_dim, inputs, outputs);
    }

    /// Backpropagate this layer's deltas to the previous layer's error vector:
    /// `prev_errors[k] = Σ_j deltas[j] * w[j][k]`.
    ///
    /// `prev_errors` is overwritten.
    #[inline]
    pub fn backward_errors(&self, deltas: &[f64], prev_errors: &mut [f64]) {
        debug_assert_eq!(deltas.len(), self.out_dim);
        debug_assert_eq!(prev_errors.len(), self.in_dim);

        prev_errors.fill(0.0);
        for (j, &delta) in deltas.iter().enumerate() {
            let row = j * self.in_dim;
            for (k, err) in prev_errors.iter_mut().enumerate() {
                *err += delta * self.weights[row + k];
            }
        }
    }

    /// Momentum weight update for a single sample.
    ///
    /// For every weight: `change = lr * delta[j] * inputs[k] + momentum * change`,
    /// then `w[j][k] += change`; biases move by `lr * delta[j]`.
    ///
    /// Shape contract:
    /// - `inputs.len() == self.in_dim`
    /// - `deltas.len() == self.out_dim`
    #[inline]
    pub fn update(&mut self, inputs: &[f64], deltas: &[f64], lr: f64, momentum: f64) {
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(deltas.len(), self.out_dim);

        for (j, &delta) in deltas.iter().enumerate() {
            let row = j * self.in_dim;
            for (k, &x) in inputs.iter().enumerate() {
                let change = lr * delta * x + momentum * self.changes[row + k];
                self.changes[row + k] = change;
                self.weights[row + k] += change;
            }
            self.biases[j] += lr * delta;
        }
    }
}

/// Dense sigmoid kernel shared by the trainable and compiled networks, so both
/// accumulate in the same order and produce identical bits.
#[inline]
pub(crate) fn dense_sigmoid(
    weights: &[f64],
    biases: &[f64],
    in_dim: usize,
    inputs: &[f64],
    outputs: &mut [f64],
) {
    debug_assert_eq!(inputs.len(), in_dim);
    debug_assert_eq!(outputs.len(), biases.len());
    debug_assert_eq!(weights.len(), in_dim * biases.len());

    for (j, out) in outputs.iter_mut().enumerate() {
        let mut sum = biases[j];
        let row = &weights[j * in_dim..(j + 1) * in_dim];
        for (&w, &x) in row.iter().zip(inputs) {
            sum += w * x;
        }
        *out = sigmoid(sum);
    }
}
