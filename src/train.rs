use log::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Dataset, Error, Example, Lookup, Network, Result, Value};

/// Per-call training options.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Maximum number of epochs.
    pub iterations: usize,
    /// Stop once the mean epoch error is at or below this value.
    pub error_threshold: f64,
    /// Overrides the network's learning rate for this call.
    pub learning_rate: Option<f64>,
    /// Log progress every `n` epochs. `None` disables progress logging.
    pub log_period: Option<usize>,
    /// Invoke the training callback every `n` epochs.
    pub callback_period: usize,
    /// Continue from the current parameters instead of re-randomizing.
    pub keep_parameters: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            iterations: 20_000,
            error_threshold: 0.005,
            learning_rate: None,
            log_period: None,
            callback_period: 10,
            keep_parameters: false,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::InvalidConfig("iterations must be > 0".to_owned()));
        }
        if !(self.error_threshold.is_finite() && self.error_threshold >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "error threshold must be finite and >= 0, got {}",
                self.error_threshold
            )));
        }
        if let Some(lr) = self.learning_rate {
            if !(lr.is_finite() && lr > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "learning rate must be finite and > 0, got {lr}"
                )));
            }
        }
        if self.log_period == Some(0) {
            return Err(Error::InvalidConfig("log period must be > 0".to_owned()));
        }
        if self.callback_period == 0 {
            return Err(Error::InvalidConfig(
                "callback period must be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Progress snapshot handed to training callbacks.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainStatus {
    /// Mean error of the epoch that just finished.
    pub error: f64,
    /// Zero-based index of that epoch.
    pub iterations: usize,
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainReport {
    /// Mean error of the last epoch run.
    pub error: f64,
    /// Number of epochs run.
    pub iterations: usize,
}

impl Network {
    /// Train on `data` until the epoch error reaches `cfg.error_threshold` or
    /// `cfg.iterations` epochs have run.
    ///
    /// Keyed records are encoded through the network's lookup tables, which are
    /// built from this data if they do not exist yet and are never rebuilt.
    pub fn train<D>(&mut self, data: &D, cfg: &TrainConfig) -> Result<TrainReport>
    where
        D: AsRef<[Example]> + ?Sized,
    {
        self.train_with_callback(data, cfg, |_| {})
    }

    /// Like [`Network::train`], invoking `callback` every `cfg.callback_period`
    /// epochs. The callback only observes; it cannot alter the run.
    pub fn train_with_callback<D, F>(
        &mut self,
        data: &D,
        cfg: &TrainConfig,
        mut callback: F,
    ) -> Result<TrainReport>
    where
        D: AsRef<[Example]> + ?Sized,
        F: FnMut(&TrainStatus),
    {
        cfg.validate()?;
        let examples = data.as_ref();
        let first = examples
            .first()
            .ok_or_else(|| Error::InvalidData("train dataset must not be empty".to_owned()))?;

        // New tables are only committed once the data and topology check out.
        let new_input = (first.input.is_keyed() && self.input_lookup().is_none())
            .then(|| build_lookup(examples.iter().map(|e| &e.input)));
        let new_output = (first.output.is_keyed() && self.output_lookup().is_none())
            .then(|| build_lookup(examples.iter().map(|e| &e.output)));

        let train = Dataset::encode(
            examples,
            new_input.as_ref().or(self.input_lookup()),
            new_output.as_ref().or(self.output_lookup()),
        )?;
        let sizes = if cfg.keep_parameters && self.is_initialized() {
            // Continue with the current (possibly imported) topology.
            if train.input_dim() != self.input_dim() || train.target_dim() != self.output_dim() {
                return Err(Error::InvalidShape(format!(
                    "dataset dims ({}, {}) do not match model dims ({}, {})",
                    train.input_dim(),
                    train.target_dim(),
                    self.input_dim(),
                    self.output_dim()
                )));
            }
            self.sizes().to_vec()
        } else {
            self.config()
                .topology(train.input_dim(), train.target_dim())
        };
        self.initialize(&sizes, cfg.keep_parameters)?;

        if let Some(lookup) = new_input {
            debug!("built input lookup with {} keys", lookup.len());
            *self.input_lookup_mut() = Some(lookup);
        }
        if let Some(lookup) = new_output {
            debug!("built output lookup with {} keys", lookup.len());
            *self.output_lookup_mut() = Some(lookup);
        }

        let lr = cfg.learning_rate.unwrap_or(self.config().learning_rate);
        Ok(self.run_epochs(&train, cfg, lr, &mut callback))
    }

    fn run_epochs<F>(
        &mut self,
        train: &Dataset,
        cfg: &TrainConfig,
        lr: f64,
        callback: &mut F,
    ) -> TrainReport
    where
        F: FnMut(&TrainStatus),
    {
        let mut error = f64::INFINITY;
        let mut epoch = 0;

        while epoch < cfg.iterations && error > cfg.error_threshold {
            let mut sum = 0.0_f64;
            for idx in 0..train.len() {
                self.forward(train.input(idx));
                sum += self.backpropagate(train.target(idx), lr);
            }
            error = sum / train.len() as f64;

            if cfg.log_period.is_some_and(|p| epoch % p == 0) {
                info!("iterations: {epoch}, training error: {error}");
            }
            if epoch % cfg.callback_period == 0 {
                callback(&TrainStatus {
                    error,
                    iterations: epoch,
                });
            }
            epoch += 1;
        }

        info!("training finished after {epoch} iterations with error {error}");
        TrainReport {
            error,
            iterations: epoch,
        }
    }
}

fn build_lookup<'a>(values: impl Iterator<Item = &'a Value>) -> Lookup {
    Lookup::build(values.filter_map(Value::as_record))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{NetworkBuilder, Record};

    fn and_gate() -> Vec<Example> {
        vec![
            Example::new([0.0, 0.0], [0.0]),
            Example::new([0.0, 1.0], [0.0]),
            Example::new([1.0, 0.0], [0.0]),
            Example::new([1.0, 1.0], [1.0]),
        ]
    }

    #[test]
    fn rejects_empty_data_and_bad_config() {
        let mut net = NetworkBuilder::new().seed(0).build().unwrap();
        let empty: Vec<Example> = Vec::new();
        assert!(matches!(
            net.train(&empty, &TrainConfig::default()),
            Err(Error::InvalidData(_))
        ));

        let cfg = TrainConfig {
            iterations: 0,
            ..TrainConfig::default()
        };
        assert!(matches!(net.train(&and_gate(), &cfg), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn derives_topology_from_data() {
        let mut net = NetworkBuilder::new().seed(0).build().unwrap();
        let cfg = TrainConfig {
            iterations: 1,
            ..TrainConfig::default()
        };
        net.train(&and_gate(), &cfg).unwrap();
        assert_eq!(net.sizes(), &[2, 3, 1]);
    }

    #[test]
    fn stops_at_iteration_limit_and_reports_epochs() {
        let mut net = NetworkBuilder::new().seed(1).build().unwrap();
        let cfg = TrainConfig {
            iterations: 7,
            error_threshold: 0.0,
            ..TrainConfig::default()
        };
        let report = net.train(&and_gate(), &cfg).unwrap();
        assert_eq!(report.iterations, 7);
        assert!(report.error > 0.0);
    }

    #[test]
    fn stops_early_once_threshold_is_met() {
        let mut net = NetworkBuilder::new().seed(1).build().unwrap();
        let cfg = TrainConfig {
            iterations: 100,
            error_threshold: 1.0,
            ..TrainConfig::default()
        };
        let report = net.train(&and_gate(), &cfg).unwrap();
        assert_eq!(report.iterations, 1);
    }

    #[test]
    fn callback_cadence_and_observation_only() {
        let cfg = TrainConfig {
            iterations: 25,
            error_threshold: 0.0,
            callback_period: 10,
            ..TrainConfig::default()
        };

        let mut seen = Vec::new();
        let mut a = NetworkBuilder::new().seed(3).build().unwrap();
        let report_a = a
            .train_with_callback(&and_gate(), &cfg, |s| seen.push(s.iterations))
            .unwrap();
        assert_eq!(seen, vec![0, 10, 20]);

        let mut b = NetworkBuilder::new().seed(3).build().unwrap();
        let report_b = b.train(&and_gate(), &cfg).unwrap();
        assert_eq!(report_a, report_b);
    }

    #[test]
    fn keyed_training_builds_lookups_once() {
        let data = vec![
            Example::new(
                Record::from([("r", 1.0), ("g", 0.0)]),
                Record::from([("warm", 1.0)]),
            ),
            Example::new(
                Record::from([("b", 1.0)]),
                Record::from([("cool", 1.0)]),
            ),
        ];
        let cfg = TrainConfig {
            iterations: 5,
            ..TrainConfig::default()
        };

        let mut net = NetworkBuilder::new().seed(0).build().unwrap();
        net.train(&data, &cfg).unwrap();
        assert_eq!(net.input_lookup().unwrap().keys(), ["r", "g", "b"]);
        assert_eq!(net.output_lookup().unwrap().keys(), ["warm", "cool"]);
        assert_eq!(net.sizes(), &[3, 3, 2]);

        // A later call with a new key reuses the frozen table.
        let more = vec![Example::new(
            Record::from([("uv", 1.0), ("r", 0.5)]),
            Record::from([("warm", 1.0)]),
        )];
        net.train(&more, &cfg).unwrap();
        assert_eq!(net.input_lookup().unwrap().keys(), ["r", "g", "b"]);
        assert_eq!(net.sizes(), &[3, 3, 2]);
    }

    #[test]
    fn keep_parameters_continues_from_current_weights() {
        let mut net = NetworkBuilder::new().seed(5).build().unwrap();
        let cfg = TrainConfig {
            iterations: 3,
            ..TrainConfig::default()
        };
        net.train(&and_gate(), &cfg).unwrap();
        let trained = net.layer(1).unwrap().weights().to_vec();

        let mut cont = net.clone();
        let keep = TrainConfig {
            iterations: 1,
            keep_parameters: true,
            learning_rate: Some(1e-12),
            ..TrainConfig::default()
        };
        cont.train(&and_gate(), &keep).unwrap();
        for (a, b) in cont.layer(1).unwrap().weights().iter().zip(&trained) {
            assert!((a - b).abs() < 1e-9);
        }

        let mut fresh = net.clone();
        fresh
            .train(
                &and_gate(),
                &TrainConfig {
                    iterations: 1,
                    learning_rate: Some(1e-12),
                    ..TrainConfig::default()
                },
            )
            .unwrap();
        assert!(
            fresh
                .layer(1)
                .unwrap()
                .weights()
                .iter()
                .zip(&trained)
                .any(|(a, b)| (a - b).abs() > 1e-9)
        );
    }

    #[test]
    fn failed_train_leaves_lookups_untouched() {
        let mut net = NetworkBuilder::new().seed(0).build().unwrap();
        let cfg = TrainConfig {
            iterations: 2,
            ..TrainConfig::default()
        };
        net.train(&and_gate(), &cfg).unwrap();

        let mixed = vec![
            Example::new([0.0, 1.0], Record::from([("a", 1.0), ("b", 0.0)])),
            Example::new([0.0, 1.0], [1.0]),
        ];
        assert!(matches!(net.train(&mixed, &cfg), Err(Error::InvalidData(_))));
        assert!(net.output_lookup().is_none());
        assert!(net.run(&Value::from([0.0, 1.0])).is_ok());

        // A width mismatch under keep_parameters is rejected after encoding.
        let keyed = vec![Example::new(
            [0.0, 1.0],
            Record::from([("a", 1.0), ("b", 0.0)]),
        )];
        let keep = TrainConfig {
            keep_parameters: true,
            ..cfg.clone()
        };
        assert!(matches!(net.train(&keyed, &keep), Err(Error::InvalidShape(_))));
        assert!(net.output_lookup().is_none());
        assert_eq!(net.sizes(), &[2, 3, 1]);
        assert!(net.export().is_ok());
    }

    #[test]
    fn single_example_trains_as_one_element_dataset() {
        let mut net = NetworkBuilder::new().seed(0).build().unwrap();
        let ex = Example::new([1.0, 0.0, 1.0], [1.0, 0.0]);
        let cfg = TrainConfig {
            iterations: 2,
            error_threshold: 0.0,
            ..TrainConfig::default()
        };
        let report = net.train(&ex, &cfg).unwrap();
        assert_eq!(report.iterations, 2);
        assert_eq!(net.sizes(), &[3, 3, 2]);
    }
}
