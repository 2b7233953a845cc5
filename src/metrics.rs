//! Evaluation.
//!
//! `Network::evaluate` runs a labeled dataset through a trained network and
//! reports the mean error plus classification results. Metrics do not
//! participate in backprop and never touch the lookup tables beyond reading
//! them.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{Dataset, Error, Example, Network, Result, loss};

/// Confusion counts and derived rates for single-output networks.
///
/// `precision` and `recall` are `NaN` when their denominator is zero.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryStats {
    pub true_pos: usize,
    pub true_neg: usize,
    pub false_pos: usize,
    pub false_neg: usize,
    pub total: usize,
    pub precision: f64,
    pub recall: f64,
    pub accuracy: f64,
}

impl BinaryStats {
    /// Tally `(actual, expected)` label pairs.
    ///
    /// Pairs where either label is not exactly 0 or 1 count toward `total` only.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut stats = Self {
            true_pos: 0,
            true_neg: 0,
            false_pos: 0,
            false_neg: 0,
            total: 0,
            precision: f64::NAN,
            recall: f64::NAN,
            accuracy: f64::NAN,
        };
        for (actual, expected) in pairs {
            stats.record(actual, expected);
        }
        stats.finish()
    }

    fn record(&mut self, actual: f64, expected: f64) {
        self.total += 1;
        if actual == 0.0 && expected == 0.0 {
            self.true_neg += 1;
        } else if actual == 1.0 && expected == 1.0 {
            self.true_pos += 1;
        } else if actual == 0.0 && expected == 1.0 {
            self.false_neg += 1;
        } else if actual == 1.0 && expected == 0.0 {
            self.false_pos += 1;
        }
    }

    fn finish(mut self) -> Self {
        let tp = self.true_pos as f64;
        self.precision = tp / (self.true_pos + self.false_pos) as f64;
        self.recall = tp / (self.true_pos + self.false_neg) as f64;
        self.accuracy = (self.true_neg + self.true_pos) as f64 / self.total as f64;
        self
    }
}

/// An example the network got wrong, with the labels that disagreed.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Misclassification {
    pub example: Example,
    /// Predicted label: 0/1 for single-output networks, else the argmax index.
    pub actual: f64,
    /// Target label: `target[0]` for single-output networks, else the argmax index.
    pub expected: f64,
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    /// Mean output MSE over the dataset.
    pub error: f64,
    pub misclassifications: Vec<Misclassification>,
    /// Present only for single-output networks.
    pub binary: Option<BinaryStats>,
}

impl Network {
    /// Evaluate the network on labeled `data`.
    pub fn evaluate<D>(&mut self, data: &D) -> Result<EvalReport>
    where
        D: AsRef<[Example]> + ?Sized,
    {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }

        let examples = data.as_ref();
        let test = Dataset::encode(examples, self.input_lookup(), self.output_lookup())?;
        if test.input_dim() != self.input_dim() {
            return Err(Error::InvalidShape(format!(
                "dataset input_dim {} does not match model input_dim {}",
                test.input_dim(),
                self.input_dim()
            )));
        }
        if test.target_dim() != self.output_dim() {
            return Err(Error::InvalidShape(format!(
                "dataset target_dim {} does not match model output_dim {}",
                test.target_dim(),
                self.output_dim()
            )));
        }

        let is_binary = self.output_dim() == 1;
        let threshold = self.config().binary_threshold;

        let mut total = 0.0_f64;
        let mut labels = Vec::with_capacity(test.len());
        let mut misclassifications = Vec::new();

        for (idx, example) in examples.iter().enumerate() {
            let target = test.target(idx);
            let output = self.forward(test.input(idx));

            let (actual, expected) = if is_binary {
                let actual = if output[0] >= threshold { 1.0 } else { 0.0 };
                (actual, target[0])
            } else {
                (argmax(output) as f64, argmax(target) as f64)
            };

            if actual != expected {
                misclassifications.push(Misclassification {
                    example: example.clone(),
                    actual,
                    expected,
                });
            }

            total += loss::mse_between(output, target);
            labels.push((actual, expected));
        }

        Ok(EvalReport {
            error: total / test.len() as f64,
            misclassifications,
            binary: is_binary.then(|| BinaryStats::from_pairs(labels)),
        })
    }
}

/// Index of the largest value; ties go to the first maximum.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    use crate::{Layer, NetworkBuilder, Record};

    /// One-input network whose single output follows its input's sign.
    fn sign_network() -> Network {
        let mut net = NetworkBuilder::new().build().unwrap();
        net.install_layers(vec![
            Layer::from_parts(1, 1, vec![20.0], vec![0.0]).unwrap(),
        ])
        .unwrap();
        net
    }

    #[test]
    fn binary_stats_standard_formulas() {
        let actual = [1.0, 0.0, 1.0, 0.0];
        let expected = [1.0, 0.0, 0.0, 1.0];
        let stats = BinaryStats::from_pairs(actual.into_iter().zip(expected));

        assert_eq!(
            (stats.true_pos, stats.true_neg, stats.false_pos, stats.false_neg),
            (1, 1, 1, 1)
        );
        assert_eq!(stats.total, 4);
        assert_abs_diff_eq!(stats.precision, 0.5);
        assert_abs_diff_eq!(stats.recall, 0.5);
        assert_abs_diff_eq!(stats.accuracy, 0.5);
    }

    #[test]
    fn degenerate_rates_are_nan() {
        let stats = BinaryStats::from_pairs([(0.0, 0.0), (0.0, 0.0)]);
        assert!(stats.precision.is_nan());
        assert!(stats.recall.is_nan());
        assert_eq!(stats.accuracy, 1.0);
    }

    #[test]
    fn argmax_breaks_ties_on_first() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[0.9]), 0);
    }

    #[test]
    fn binary_evaluation_collects_misclassifications() {
        let mut net = sign_network();
        let data = vec![
            Example::new([1.0], [1.0]),
            Example::new([-1.0], [0.0]),
            Example::new([1.0], [0.0]),
        ];

        let report = net.evaluate(&data).unwrap();
        let stats = report.binary.unwrap();
        assert_eq!((stats.true_pos, stats.true_neg, stats.false_pos), (1, 1, 1));
        assert_eq!(report.misclassifications.len(), 1);

        let miss = &report.misclassifications[0];
        assert_eq!(miss.example, data[2]);
        assert_eq!((miss.actual, miss.expected), (1.0, 0.0));
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut net = NetworkBuilder::new().binary_threshold(0.5).build().unwrap();
        net.install_layers(vec![Layer::from_parts(1, 1, vec![0.0], vec![0.0]).unwrap()])
            .unwrap();
        // sigmoid(0) == 0.5 exactly.
        let report = net.evaluate(&Example::new([3.0], [1.0])).unwrap();
        assert!(report.misclassifications.is_empty());
    }

    #[test]
    fn multiclass_uses_argmax_and_skips_binary_stats() {
        let mut net = NetworkBuilder::new().build().unwrap();
        net.install_layers(vec![
            Layer::from_parts(2, 2, vec![10.0, 0.0, 0.0, 10.0], vec![0.0, 0.0]).unwrap(),
        ])
        .unwrap();

        let data = vec![
            Example::new([1.0, 0.0], [1.0, 0.0]),
            Example::new([1.0, 0.0], [0.0, 1.0]),
        ];
        let report = net.evaluate(&data).unwrap();
        assert!(report.binary.is_none());
        assert_eq!(report.misclassifications.len(), 1);
        assert_eq!(report.misclassifications[0].actual, 0.0);
        assert_eq!(report.misclassifications[0].expected, 1.0);
    }

    #[test]
    fn error_is_mean_output_mse() {
        let mut net = sign_network();
        let data = vec![Example::new([0.0], [1.0]), Example::new([0.0], [0.0])];
        let report = net.evaluate(&data).unwrap();
        // Both outputs are exactly 0.5.
        assert_abs_diff_eq!(report.error, 0.25, epsilon = 1e-15);
    }

    #[test]
    fn evaluation_never_builds_lookups() {
        let mut net = sign_network();
        let data = Example::new(Record::from([("x", 1.0)]), [1.0]);
        assert!(matches!(net.evaluate(&data), Err(Error::InvalidData(_))));
        assert!(net.input_lookup().is_none());

        let mut untrained = Network::new();
        assert!(matches!(
            untrained.evaluate(&Example::new([1.0], [1.0])),
            Err(Error::NotInitialized)
        ));
    }
}
