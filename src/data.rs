//! Training data and its dense encoding.
//!
//! Callers hand the network [`Example`]s whose input and output are either
//! dense vectors or keyed [`Record`]s. Before anything reaches the numeric core,
//! examples are encoded (through the network's lookup tables when keyed) into a
//! [`Dataset`], which stores inputs and targets contiguously in row-major layout.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Lookup, Record, Result};

/// One side of a training example.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Vector(Vec<f64>),
    Keyed(Record),
}

impl Value {
    #[inline]
    pub fn is_keyed(&self) -> bool {
        matches!(self, Value::Keyed(_))
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(v) => Some(v),
            Value::Keyed(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Vector(_) => None,
            Value::Keyed(r) => Some(r),
        }
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Vector(v)
    }
}

impl From<&[f64]> for Value {
    fn from(v: &[f64]) -> Self {
        Value::Vector(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(v: [f64; N]) -> Self {
        Value::Vector(v.to_vec())
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Keyed(r)
    }
}

/// An `{input, output}` training pair.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub input: Value,
    pub output: Value,
}

impl Example {
    pub fn new(input: impl Into<Value>, output: impl Into<Value>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// A single example behaves as a one-element dataset.
impl AsRef<[Example]> for Example {
    fn as_ref(&self) -> &[Example] {
        std::slice::from_ref(self)
    }
}

/// Training data as it arrives from outside: one example or many.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingData {
    One(Example),
    Many(Vec<Example>),
}

impl AsRef<[Example]> for TrainingData {
    fn as_ref(&self) -> &[Example] {
        match self {
            TrainingData::One(e) => std::slice::from_ref(e),
            TrainingData::Many(v) => v,
        }
    }
}

impl From<Example> for TrainingData {
    fn from(e: Example) -> Self {
        TrainingData::One(e)
    }
}

impl From<Vec<Example>> for TrainingData {
    fn from(v: Vec<Example>) -> Self {
        TrainingData::Many(v)
    }
}

/// A supervised dataset: inputs (X) and targets (Y).
///
/// Stored as contiguous buffers with row-major layout:
/// - `inputs.len() == len * input_dim`
/// - `targets.len() == len * target_dim`
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Vec<f64>,
    targets: Vec<f64>,
    len: usize,
    input_dim: usize,
    target_dim: usize,
}

impl Dataset {
    /// Build a dataset from flat buffers.
    ///
    /// `inputs` is `(len, input_dim)` and `targets` is `(len, target_dim)`.
    pub fn from_flat(
        inputs: Vec<f64>,
        targets: Vec<f64>,
        input_dim: usize,
        target_dim: usize,
    ) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidData("input_dim must be > 0".to_owned()));
        }
        if target_dim == 0 {
            return Err(Error::InvalidData("target_dim must be > 0".to_owned()));
        }
        if inputs.len() % input_dim != 0 {
            return Err(Error::InvalidData(format!(
                "inputs length {} is not divisible by input_dim {}",
                inputs.len(),
                input_dim
            )));
        }

        let len = inputs.len() / input_dim;
        if targets.len() != len * target_dim {
            return Err(Error::InvalidData(format!(
                "targets length {} does not match len * target_dim ({} * {})",
                targets.len(),
                len,
                target_dim
            )));
        }

        Ok(Self {
            inputs,
            targets,
            len,
            input_dim,
            target_dim,
        })
    }

    /// Build a dataset from per-sample rows.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::InvalidData(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        if inputs.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }

        let input_dim = inputs[0].len();
        let target_dim = targets[0].len();
        let inputs = flatten_rows(inputs, input_dim, "input")?;
        let targets = flatten_rows(targets, target_dim, "target")?;
        Self::from_flat(inputs, targets, input_dim, target_dim)
    }

    /// Encode examples into a dense dataset.
    ///
    /// Keyed sides are encoded through the given lookup. Every example must agree
    /// with the first one on whether each side is keyed.
    pub fn encode(
        examples: &[Example],
        input_lookup: Option<&Lookup>,
        output_lookup: Option<&Lookup>,
    ) -> Result<Self> {
        let first = examples
            .first()
            .ok_or_else(|| Error::InvalidData("dataset must not be empty".to_owned()))?;

        let keyed_input = first.input.is_keyed();
        let keyed_output = first.output.is_keyed();

        let mut inputs = Vec::with_capacity(examples.len());
        let mut targets = Vec::with_capacity(examples.len());
        for (i, ex) in examples.iter().enumerate() {
            if ex.input.is_keyed() != keyed_input || ex.output.is_keyed() != keyed_output {
                return Err(Error::InvalidData(format!(
                    "example {i} mixes keyed and vector records with example 0"
                )));
            }
            inputs.push(encode_value(&ex.input, input_lookup, "input")?);
            targets.push(encode_value(&ex.output, output_lookup, "output")?);
        }

        Self::from_rows(&inputs, &targets)
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    /// Returns the per-sample input dimension.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    /// Returns the per-sample target dimension.
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    #[inline]
    /// Returns the `idx`-th input row (shape: `(input_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f64] {
        let start = idx * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }

    #[inline]
    /// Returns the `idx`-th target row (shape: `(target_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn target(&self, idx: usize) -> &[f64] {
        let start = idx * self.target_dim;
        &self.targets[start..start + self.target_dim]
    }
}

/// Encode one value: vectors pass through, keyed records go through `lookup`.
pub(crate) fn encode_value(value: &Value, lookup: Option<&Lookup>, side: &str) -> Result<Vec<f64>> {
    match (value, lookup) {
        (Value::Vector(v), _) => Ok(v.clone()),
        (Value::Keyed(r), Some(lookup)) => Ok(lookup.to_vector(r)),
        (Value::Keyed(_), None) => Err(Error::InvalidData(format!(
            "keyed {side} record but the network has no {side} lookup"
        ))),
    }
}

fn flatten_rows(rows: &[Vec<f64>], dim: usize, what: &str) -> Result<Vec<f64>> {
    let mut flat = Vec::with_capacity(rows.len() * dim);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(Error::InvalidData(format!(
                "{what} row {i} has len {}, expected {dim}",
                row.len()
            )));
        }
        flat.extend_from_slice(row);
    }
    Ok(flat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_from_flat_validates_shapes() {
        let ok = Dataset::from_flat(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0], 2, 1);
        assert!(ok.is_ok());

        let err = Dataset::from_flat(vec![0.0, 1.0, 2.0], vec![0.0], 2, 1);
        assert!(err.is_err());
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = Dataset::from_rows(&[vec![0.0, 1.0], vec![1.0]], &[vec![0.0], vec![1.0]]);
        assert!(matches!(err, Err(Error::InvalidData(_))));
    }

    #[test]
    fn encode_uses_lookups_for_keyed_sides() {
        let lookup = Lookup::from_keys(["x", "y"]);
        let examples = vec![
            Example::new(Record::from([("y", 0.5)]), [1.0]),
            Example::new(Record::from([("x", 0.25), ("y", 0.75)]), [0.0]),
        ];

        let data = Dataset::encode(&examples, Some(&lookup), None).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.input(0), &[0.0, 0.5]);
        assert_eq!(data.input(1), &[0.25, 0.75]);
        assert_eq!(data.target(1), &[0.0]);
    }

    #[test]
    fn encode_rejects_mixed_shapes() {
        let lookup = Lookup::from_keys(["x"]);
        let examples = vec![
            Example::new(Record::from([("x", 1.0)]), [1.0]),
            Example::new([1.0], [0.0]),
        ];
        assert!(Dataset::encode(&examples, Some(&lookup), None).is_err());
    }

    #[test]
    fn single_example_is_a_one_element_dataset() {
        let ex = Example::new([0.0, 1.0], [1.0]);
        assert_eq!(ex.as_ref().len(), 1);

        let data = TrainingData::from(ex.clone());
        assert_eq!(data.as_ref(), std::slice::from_ref(&ex));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn training_data_parses_one_or_many() {
        let one: TrainingData =
            serde_json::from_str(r#"{"input":[0,1],"output":{"yes":1}}"#).unwrap();
        assert_eq!(one.as_ref().len(), 1);
        assert!(one.as_ref()[0].output.is_keyed());

        let many: TrainingData = serde_json::from_str(
            r#"[{"input":[0,1],"output":[1]},{"input":[1,1],"output":[0]}]"#,
        )
        .unwrap();
        assert_eq!(many.as_ref().len(), 2);
    }
}
