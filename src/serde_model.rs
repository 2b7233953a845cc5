//! Network export/import.
//!
//! The exported document is an ordered list of layers, each mapping a unit id to
//! that unit's bias and incoming weights, where the weights are keyed by the
//! previous layer's unit ids. Unit ids are positions (`"0"`, `"1"`, ...) except
//! on boundary layers backed by a lookup table, which use the table's keys in
//! index order. Two flags record whether the input/output lookups existed, so a
//! keyed boundary whose keys look numeric still imports as keyed.
//!
//! Design notes:
//! - We do NOT directly serialize internal `Network`/`Layer` structs, to keep the
//!   document layout stable even if internal representation changes.
//! - Import validates the whole document before touching the target network.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use std::path::Path;

use crate::{Error, KeyedMap, Layer, Lookup, Network, NetworkConfig, Result};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedNetwork {
    pub layers: Vec<KeyedMap<UnitParams>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub output_lookup: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub input_lookup: bool,
}

/// One unit's parameters. Input-layer units carry neither field.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitParams {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub bias: Option<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub weights: Option<KeyedMap<f64>>,
}

impl ExportedNetwork {
    /// Whether the input layer is keyed. Documents without the flag fall back to
    /// checking for a unit with id `"0"`.
    pub fn input_keyed(&self) -> bool {
        self.input_lookup || self.layers.first().is_some_and(|l| !l.contains_key("0"))
    }

    /// Whether the output layer is keyed (same fallback as [`Self::input_keyed`]).
    pub fn output_keyed(&self) -> bool {
        self.output_lookup || self.layers.last().is_some_and(|l| !l.contains_key("0"))
    }

    /// Validate the document and rebuild its dense layers and lookups.
    pub(crate) fn to_parts(&self) -> Result<(Vec<Layer>, Option<Lookup>, Option<Lookup>)> {
        if self.layers.len() < 2 {
            return Err(Error::InvalidData(format!(
                "serialized network must have at least 2 layers, got {}",
                self.layers.len()
            )));
        }
        if let Some(i) = self.layers.iter().position(|l| l.is_empty()) {
            return Err(Error::InvalidData(format!("layer {i} has no units")));
        }

        let mut layers = Vec::with_capacity(self.layers.len() - 1);
        for l in 1..self.layers.len() {
            let prev = &self.layers[l - 1];
            let prev_index: HashMap<&str, usize> =
                prev.keys().enumerate().map(|(i, k)| (k, i)).collect();
            let in_dim = prev.len();
            let out_dim = self.layers[l].len();

            let mut weights = Vec::with_capacity(in_dim * out_dim);
            let mut biases = Vec::with_capacity(out_dim);
            for (unit, params) in self.layers[l].iter() {
                let bias = params.bias.ok_or_else(|| {
                    Error::InvalidData(format!("layer {l} unit {unit:?} has no bias"))
                })?;
                let unit_weights = params.weights.as_ref().ok_or_else(|| {
                    Error::InvalidData(format!("layer {l} unit {unit:?} has no weights"))
                })?;
                if unit_weights.len() != in_dim {
                    return Err(Error::InvalidData(format!(
                        "layer {l} unit {unit:?} has {} weights, expected {in_dim}",
                        unit_weights.len()
                    )));
                }

                let mut row = vec![0.0; in_dim];
                for (key, &w) in unit_weights.iter() {
                    let k = prev_index.get(key).ok_or_else(|| {
                        Error::InvalidData(format!(
                            "layer {l} unit {unit:?} has a weight for unknown unit {key:?}"
                        ))
                    })?;
                    row[*k] = w;
                }
                weights.extend_from_slice(&row);
                biases.push(bias);
            }

            // Layer::from_parts performs shape validation and finiteness checks.
            let layer = Layer::from_parts(in_dim, out_dim, weights, biases)
                .map_err(|e| Error::InvalidData(format!("layer {l} invalid: {e}")))?;
            layers.push(layer);
        }

        let input_lookup = self
            .input_keyed()
            .then(|| Lookup::from_keys(self.layers[0].keys()));
        let output_lookup = self
            .output_keyed()
            .then(|| Lookup::from_keys(self.layers[self.layers.len() - 1].keys()));

        Ok((layers, input_lookup, output_lookup))
    }
}

impl Network {
    /// Export topology, parameters and lookup keys.
    pub fn export(&self) -> Result<ExportedNetwork> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }

        let last = self.output_layer();
        let ids: Vec<Vec<String>> = self
            .sizes()
            .iter()
            .enumerate()
            .map(|(l, &size)| {
                let lookup = match l {
                    0 => self.input_lookup(),
                    l if l == last => self.output_lookup(),
                    _ => None,
                };
                match lookup {
                    Some(lookup) => lookup.keys().to_vec(),
                    None => (0..size).map(|i| i.to_string()).collect(),
                }
            })
            .collect();

        let mut layers: Vec<KeyedMap<UnitParams>> = Vec::with_capacity(ids.len());
        layers.push(
            ids[0]
                .iter()
                .map(|id| (id.as_str(), UnitParams::default()))
                .collect(),
        );
        for (l, layer) in self.layers().iter().enumerate().map(|(i, x)| (i + 1, x)) {
            let units = ids[l]
                .iter()
                .enumerate()
                .map(|(j, id)| {
                    let weights = ids[l - 1]
                        .iter()
                        .zip(layer.row(j))
                        .map(|(k, &w)| (k.as_str(), w))
                        .collect();
                    let params = UnitParams {
                        bias: Some(layer.biases()[j]),
                        weights: Some(weights),
                    };
                    (id.as_str(), params)
                })
                .collect();
            layers.push(units);
        }

        Ok(ExportedNetwork {
            layers,
            output_lookup: self.output_lookup().is_some(),
            input_lookup: self.input_lookup().is_some(),
        })
    }

    /// Replace this network's topology, parameters and lookups with `doc`.
    ///
    /// The network's configuration (learning rate, momentum, threshold) is kept.
    /// On error the network is left untouched.
    pub fn import(&mut self, doc: &ExportedNetwork) -> Result<()> {
        let (layers, input_lookup, output_lookup) = doc.to_parts()?;
        self.install_layers(layers)?;
        self.set_lookups(input_lookup, output_lookup);
        Ok(())
    }

    /// Build a network with `config` from an exported document.
    pub fn from_exported(doc: &ExportedNetwork, config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        let mut net = Network::with_config(config);
        net.import(doc)?;
        Ok(net)
    }
}

impl TryFrom<&ExportedNetwork> for Network {
    type Error = Error;

    fn try_from(doc: &ExportedNetwork) -> std::result::Result<Self, Self::Error> {
        Network::from_exported(doc, NetworkConfig::default())
    }
}

#[cfg(feature = "serde")]
impl Network {
    /// Serialize the network to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export()?)?)
    }

    /// Serialize the network to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.export()?)?)
    }

    /// Parse a network (with default settings) from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let doc: ExportedNetwork = serde_json::from_str(s)?;
        Network::try_from(&doc)
    }

    /// Save the network to a JSON file (pretty-printed).
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        std::fs::write(path, s)?;
        Ok(())
    }

    /// Load a network from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }
}
