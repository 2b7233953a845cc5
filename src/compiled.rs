//! Inference-only networks.
//!
//! A `CompiledNetwork` is built from an [`ExportedNetwork`] and holds nothing but
//! dense layer parameters and the boundary lookup tables. It has no training
//! state, so it can be shipped and run independently of [`Network`]. Its forward
//! pass uses the same kernel as the trainable network and produces the same
//! bits for the same parameters.

#[cfg(feature = "serde")]
use std::path::Path;

use crate::data::encode_value;
use crate::layer::dense_sigmoid;
use crate::{Error, ExportedNetwork, Lookup, Network, Result, Value};

#[derive(Debug, Clone)]
struct CompiledLayer {
    in_dim: usize,
    weights: Vec<f64>,
    biases: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct CompiledNetwork {
    layers: Vec<CompiledLayer>,
    input_dim: usize,
    input_lookup: Option<Lookup>,
    output_lookup: Option<Lookup>,
}

impl CompiledNetwork {
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.layers.last().map(|l| l.biases.len()).unwrap_or(0)
    }

    #[inline]
    pub fn input_lookup(&self) -> Option<&Lookup> {
        self.input_lookup.as_ref()
    }

    #[inline]
    pub fn output_lookup(&self) -> Option<&Lookup> {
        self.output_lookup.as_ref()
    }

    /// Dense forward pass. Returns the output layer's activations.
    ///
    /// Shape contract: `input.len() == self.input_dim()`.
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        assert_eq!(
            input.len(),
            self.input_dim,
            "input len {} does not match model input_dim {}",
            input.len(),
            self.input_dim
        );

        let mut current = input.to_vec();
        for layer in &self.layers {
            let mut next = vec![0.0; layer.biases.len()];
            dense_sigmoid(&layer.weights, &layer.biases, layer.in_dim, &current, &mut next);
            current = next;
        }
        current
    }

    /// Run one record, with the same encode/decode rules as [`Network::run`].
    pub fn run(&self, input: &Value) -> Result<Value> {
        let encoded = encode_value(input, self.input_lookup.as_ref(), "input")?;
        if encoded.len() != self.input_dim {
            return Err(Error::InvalidShape(format!(
                "input len {} does not match model input_dim {}",
                encoded.len(),
                self.input_dim
            )));
        }

        let output = self.forward(&encoded);
        Ok(match &self.output_lookup {
            Some(lookup) => Value::Keyed(lookup.to_record(&output)),
            None => Value::Vector(output),
        })
    }
}

impl TryFrom<&ExportedNetwork> for CompiledNetwork {
    type Error = Error;

    fn try_from(doc: &ExportedNetwork) -> std::result::Result<Self, Self::Error> {
        let (layers, input_lookup, output_lookup) = doc.to_parts()?;
        let input_dim = layers.first().map(|l| l.in_dim()).unwrap_or(0);
        let layers = layers
            .iter()
            .map(|l| CompiledLayer {
                in_dim: l.in_dim(),
                weights: l.weights().to_vec(),
                biases: l.biases().to_vec(),
            })
            .collect();

        Ok(Self {
            layers,
            input_dim,
            input_lookup,
            output_lookup,
        })
    }
}

impl Network {
    /// Snapshot the current parameters as an inference-only network.
    pub fn compile(&self) -> Result<CompiledNetwork> {
        CompiledNetwork::try_from(&self.export()?)
    }
}

#[cfg(feature = "serde")]
impl CompiledNetwork {
    /// Parse an exported network document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let doc: ExportedNetwork = serde_json::from_str(s)?;
        Self::try_from(&doc)
    }

    /// Load an exported network document from a file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{NetworkBuilder, Record};

    #[test]
    fn matches_trainable_network_bit_for_bit() {
        let mut net = NetworkBuilder::new().seed(11).build().unwrap();
        net.initialize(&[4, 6, 3, 2], false).unwrap();
        let compiled = net.compile().unwrap();

        assert_eq!(compiled.input_dim(), 4);
        assert_eq!(compiled.output_dim(), 2);
        for input in [[0.0; 4], [0.5, -1.5, 3.0, 0.25], [9.0, 9.0, -9.0, 1.0]] {
            assert_eq!(compiled.forward(&input).as_slice(), net.forward(&input));
        }
    }

    #[test]
    fn keyed_run_uses_lookups_and_drops_unknown_keys() {
        let mut net = NetworkBuilder::new().seed(2).build().unwrap();
        net.initialize(&[2, 3, 2], false).unwrap();
        net.set_lookups(
            Some(Lookup::from_keys(["a", "b"])),
            Some(Lookup::from_keys(["hot", "cold"])),
        );
        let compiled = net.compile().unwrap();

        let input = Value::Keyed(Record::from([("a", 0.3), ("unseen", 7.0)]));
        let out = compiled.run(&input).unwrap();
        assert_eq!(out, net.run(&input).unwrap());
        assert_eq!(out, net.run(&Value::Keyed(Record::from([("a", 0.3)]))).unwrap());

        assert!(compiled.run(&Value::from([1.0, 2.0, 3.0])).is_err());
    }

    #[test]
    fn survives_the_trainable_network_changing() {
        let mut net = NetworkBuilder::new().seed(4).build().unwrap();
        net.initialize(&[2, 2], false).unwrap();
        let compiled = net.compile().unwrap();
        let before = compiled.forward(&[1.0, 1.0]);

        net.initialize(&[2, 2], false).unwrap();
        assert_eq!(compiled.forward(&[1.0, 1.0]), before);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_from_exported_json() {
        let mut net = NetworkBuilder::new().seed(8).build().unwrap();
        net.initialize(&[3, 3, 1], false).unwrap();
        let compiled = CompiledNetwork::from_json_str(&net.to_json_string().unwrap()).unwrap();

        let input = [0.2, 0.4, 0.6];
        assert_eq!(compiled.forward(&input).as_slice(), net.forward(&input));
    }
}
