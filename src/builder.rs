//! Network builder.
//!
//! `NetworkBuilder` is the recommended way to define a network. It collects the
//! network-level settings (hidden layer widths, learning rate, momentum, binary
//! threshold, seed), validates them, and produces an uninitialized [`Network`].
//! Input and output widths are taken from the data on the first `train` call.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Network, Result};

/// Network-level settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    /// Hidden layer widths. `None` uses one layer of `max(3, input_dim / 2)`.
    pub hidden_layers: Option<Vec<usize>>,
    /// Default learning rate for `train` calls that do not set one.
    pub learning_rate: f64,
    pub momentum: f64,
    /// Single-output activations at or above this classify as 1.
    pub binary_threshold: f64,
    /// Seed for weight initialization. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hidden_layers: None,
            learning_rate: 0.3,
            momentum: 0.1,
            binary_threshold: 0.5,
            seed: None,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(hidden) = &self.hidden_layers {
            if hidden.contains(&0) {
                return Err(Error::InvalidConfig(
                    "hidden layer widths must be > 0".to_owned(),
                ));
            }
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if !(self.momentum.is_finite() && (0.0..1.0).contains(&self.momentum)) {
            return Err(Error::InvalidConfig(format!(
                "momentum must be finite and in [0,1), got {}",
                self.momentum
            )));
        }
        if !self.binary_threshold.is_finite() {
            return Err(Error::InvalidConfig(
                "binary threshold must be finite".to_owned(),
            ));
        }
        Ok(())
    }

    /// Full topology for the given boundary widths.
    pub fn topology(&self, input_dim: usize, output_dim: usize) -> Vec<usize> {
        let mut sizes = vec![input_dim];
        match &self.hidden_layers {
            Some(hidden) => sizes.extend_from_slice(hidden),
            None => sizes.push(default_hidden_width(input_dim)),
        }
        sizes.push(output_dim);
        sizes
    }
}

/// Width of the single hidden layer used when none is configured.
#[inline]
pub fn default_hidden_width(input_dim: usize) -> usize {
    (input_dim / 2).max(3)
}

#[derive(Debug, Clone, Default)]
/// Builder for a `Network`.
///
/// Example:
///
/// ```rust
/// use sigmoid_mlp::NetworkBuilder;
///
/// # fn main() -> sigmoid_mlp::Result<()> {
/// let net = NetworkBuilder::new()
///     .hidden_layers([4])
///     .learning_rate(0.3)
///     .seed(0)
///     .build()?;
/// assert!(!net.is_initialized());
/// # Ok(())
/// # }
/// ```
pub struct NetworkBuilder {
    config: NetworkConfig,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: NetworkConfig) -> Self {
        Self { config }
    }

    pub fn hidden_layers(mut self, sizes: impl Into<Vec<usize>>) -> Self {
        self.config.hidden_layers = Some(sizes.into());
        self
    }

    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.config.learning_rate = lr;
        self
    }

    pub fn momentum(mut self, momentum: f64) -> Self {
        self.config.momentum = momentum;
        self
    }

    pub fn binary_threshold(mut self, threshold: f64) -> Self {
        self.config.binary_threshold = threshold;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Network> {
        self.config.validate()?;
        Ok(Network::with_config(self.config))
    }
}
