use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::activation::sigmoid_grad_from_output;
use crate::data::encode_value;
use crate::{Error, Layer, Lookup, NetworkConfig, Result, Value, loss};

/// A layered sigmoid network trained by backpropagation with momentum.
///
/// The network owns its topology, parameters, per-layer scratch buffers and
/// (optionally) the input/output lookup tables used for keyed records. A freshly
/// built network is uninitialized: `train`, `initialize` or `import` give it a
/// topology.
#[derive(Debug, Clone)]
pub struct Network {
    config: NetworkConfig,
    sizes: Vec<usize>,
    /// `layers[l - 1]` connects layer `l - 1` to layer `l`.
    layers: Vec<Layer>,
    scratch: Scratch,
    input_lookup: Option<Lookup>,
    output_lookup: Option<Lookup>,
    rng: StdRng,
}

/// Per-layer transient buffers for layers `0..=L`.
///
/// `outputs[0]` holds the raw input of the most recent forward pass.
#[derive(Debug, Clone, Default)]
pub struct Scratch {
    outputs: Vec<Vec<f64>>,
    errors: Vec<Vec<f64>>,
    deltas: Vec<Vec<f64>>,
}

impl Scratch {
    fn new(sizes: &[usize]) -> Self {
        Self {
            outputs: sizes.iter().map(|&n| vec![0.0; n]).collect(),
            errors: sizes.iter().map(|&n| vec![0.0; n]).collect(),
            deltas: sizes.iter().map(|&n| vec![0.0; n]).collect(),
        }
    }

    #[inline]
    pub fn output(&self) -> &[f64] {
        self.outputs.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::with_config(NetworkConfig::default())
    }
}

impl Network {
    /// An uninitialized network with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// An uninitialized network. `config` is assumed valid; use
    /// [`crate::NetworkBuilder`] for checked construction.
    pub fn with_config(config: NetworkConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            sizes: Vec::new(),
            layers: Vec::new(),
            scratch: Scratch::default(),
            input_lookup: None,
            output_lookup: None,
            rng,
        }
    }

    /// Size the network for `sizes` (input width first, output width last).
    ///
    /// With `keep_parameters == false` weights and biases are redrawn uniformly
    /// from `[-0.2, 0.2]`. With `keep_parameters == true` the current parameters
    /// are kept, which requires the topology to be unchanged. In both cases the
    /// scratch buffers and the momentum store are reset.
    pub fn initialize(&mut self, sizes: &[usize], keep_parameters: bool) -> Result<()> {
        if sizes.len() < 2 {
            return Err(Error::InvalidConfig(
                "sizes must include input and output dims".to_owned(),
            ));
        }
        if sizes.contains(&0) {
            return Err(Error::InvalidConfig(
                "all layer sizes must be > 0".to_owned(),
            ));
        }

        if keep_parameters {
            if self.sizes != sizes {
                return Err(Error::InvalidConfig(format!(
                    "cannot keep parameters: topology {:?} differs from current {:?}",
                    sizes, self.sizes
                )));
            }
            for layer in &mut self.layers {
                layer.reset_changes();
            }
        } else {
            let rng = &mut self.rng;
            self.layers = sizes
                .windows(2)
                .map(|w| Layer::new_with_rng(w[0], w[1], rng))
                .collect();
            self.sizes = sizes.to_vec();
        }

        self.scratch = Scratch::new(sizes);
        debug!("initialized network sizes={sizes:?} keep_parameters={keep_parameters}");
        Ok(())
    }

    /// Replace the whole parameter store with explicit layers.
    pub(crate) fn install_layers(&mut self, layers: Vec<Layer>) -> Result<()> {
        let first = layers
            .first()
            .ok_or_else(|| Error::InvalidConfig("network must have at least one layer".to_owned()))?;

        let mut sizes = Vec::with_capacity(layers.len() + 1);
        sizes.push(first.in_dim());
        for (i, layer) in layers.iter().enumerate() {
            let expected = sizes[i];
            if layer.in_dim() != expected {
                return Err(Error::InvalidShape(format!(
                    "layer {} in_dim {} does not match previous out_dim {expected}",
                    i + 1,
                    layer.in_dim()
                )));
            }
            sizes.push(layer.out_dim());
        }

        self.layers = layers;
        self.sizes = sizes.clone();
        self.initialize(&sizes, true)
    }

    pub(crate) fn set_lookups(&mut self, input: Option<Lookup>, output: Option<Lookup>) {
        self.input_lookup = input;
        self.output_lookup = output;
    }

    pub(crate) fn input_lookup_mut(&mut self) -> &mut Option<Lookup> {
        &mut self.input_lookup
    }

    pub(crate) fn output_lookup_mut(&mut self) -> &mut Option<Lookup> {
        &mut self.output_lookup
    }

    #[inline]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Layer sizes, input first. Empty until initialized.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.sizes.first().copied().unwrap_or(0)
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.sizes.last().copied().unwrap_or(0)
    }

    /// Index of the output layer (`L`).
    #[inline]
    pub fn output_layer(&self) -> usize {
        self.sizes.len().saturating_sub(1)
    }

    /// Parameters feeding layer `l` (`1..=L`).
    #[inline]
    pub fn layer(&self, l: usize) -> Option<&Layer> {
        l.checked_sub(1).and_then(|i| self.layers.get(i))
    }

    #[inline]
    pub fn layer_mut(&mut self, l: usize) -> Option<&mut Layer> {
        l.checked_sub(1).and_then(|i| self.layers.get_mut(i))
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn input_lookup(&self) -> Option<&Lookup> {
        self.input_lookup.as_ref()
    }

    #[inline]
    pub fn output_lookup(&self) -> Option<&Lookup> {
        self.output_lookup.as_ref()
    }

    /// Activations of layer `l` from the most recent forward pass.
    #[inline]
    pub fn outputs(&self, l: usize) -> &[f64] {
        &self.scratch.outputs[l]
    }

    /// Error vector of layer `l` from the most recent backward pass.
    #[inline]
    pub fn errors(&self, l: usize) -> &[f64] {
        &self.scratch.errors[l]
    }

    /// Delta vector of layer `l` from the most recent backward pass.
    #[inline]
    pub fn deltas(&self, l: usize) -> &[f64] {
        &self.scratch.deltas[l]
    }

    #[inline]
    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    /// Forward pass for a single sample.
    ///
    /// Writes every layer's activations into the network's scratch and returns
    /// the output layer's activations.
    ///
    /// Shape contract:
    /// - the network is initialized
    /// - `input.len() == self.input_dim()`
    pub fn forward(&mut self, input: &[f64]) -> &[f64] {
        assert!(self.is_initialized(), "forward called on uninitialized network");
        assert_eq!(
            input.len(),
            self.input_dim(),
            "input len {} does not match model input_dim {}",
            input.len(),
            self.input_dim()
        );

        let outputs = &mut self.scratch.outputs;
        outputs[0].copy_from_slice(input);
        for (idx, layer) in self.layers.iter().enumerate() {
            // Borrow the previous output immutably and the current output mutably.
            let (left, right) = outputs.split_at_mut(idx + 1);
            layer.forward(&left[idx], &mut right[0]);
        }

        self.scratch.output()
    }

    /// Backward pass and momentum update for a single sample.
    ///
    /// You must call `forward` first on the matching input. Computes errors and
    /// deltas for every layer (output down to input), then updates weights and
    /// biases of layers `1..=L`.
    ///
    /// Returns the mean squared error of the output layer's error vector.
    ///
    /// Shape contract: `target.len() == self.output_dim()`.
    pub fn backpropagate(&mut self, target: &[f64], learning_rate: f64) -> f64 {
        assert!(
            self.is_initialized(),
            "backpropagate called on uninitialized network"
        );
        assert_eq!(
            target.len(),
            self.output_dim(),
            "target len {} does not match model output_dim {}",
            target.len(),
            self.output_dim()
        );

        self.calculate_deltas(target);
        self.adjust_weights(learning_rate);

        loss::mse(&self.scratch.errors[self.output_layer()])
    }

    fn calculate_deltas(&mut self, target: &[f64]) {
        let last = self.output_layer();
        let Scratch {
            outputs,
            errors,
            deltas,
        } = &mut self.scratch;

        for l in (0..=last).rev() {
            if l == last {
                for ((err, &t), &y) in errors[l].iter_mut().zip(target).zip(&outputs[l]) {
                    *err = t - y;
                }
            } else {
                self.layers[l].backward_errors(&deltas[l + 1], &mut errors[l]);
            }

            for ((delta, &err), &y) in deltas[l].iter_mut().zip(&errors[l]).zip(&outputs[l]) {
                *delta = err * sigmoid_grad_from_output(y);
            }
        }
    }

    fn adjust_weights(&mut self, learning_rate: f64) {
        let momentum = self.config.momentum;
        for (idx, layer) in self.layers.iter_mut().enumerate() {
            layer.update(
                &self.scratch.outputs[idx],
                &self.scratch.deltas[idx + 1],
                learning_rate,
                momentum,
            );
        }
    }

    /// Run one record through the network.
    ///
    /// Keyed inputs are encoded with the input lookup (unknown keys are ignored,
    /// missing keys read as 0); when an output lookup exists the result is a
    /// keyed record, otherwise a vector.
    pub fn run(&mut self, input: &Value) -> Result<Value> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }

        let encoded = encode_value(input, self.input_lookup.as_ref(), "input")?;
        if encoded.len() != self.input_dim() {
            return Err(Error::InvalidShape(format!(
                "input len {} does not match model input_dim {}",
                encoded.len(),
                self.input_dim()
            )));
        }

        self.forward(&encoded);
        let output = self.scratch.output();
        Ok(match &self.output_lookup {
            Some(lookup) => Value::Keyed(lookup.to_record(output)),
            None => Value::Vector(output.to_vec()),
        })
    }
}
