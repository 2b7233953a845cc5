//! A small feedforward sigmoid network.
//!
//! `sigmoid-mlp` builds a layered network of sigmoid units, trains it by
//! backpropagation with momentum, evaluates it, and exports/imports its trained
//! parameters. Inputs and outputs can be dense vectors or keyed records: keyed
//! data is mapped to dense positions through lookup tables built once from the
//! first keyed dataset the network sees.
//!
//! # Panics vs `Result`
//!
//! This crate intentionally exposes two layers of API:
//!
//! - Low-level hot path (panics on misuse):
//!   - [`Network::forward`], [`Network::backpropagate`]
//!     Shape mismatches are treated as programmer error and will panic via `assert!`.
//!
//! - High-level convenience APIs (shape-checked):
//!   - [`Network::train`], [`Network::evaluate`], [`Network::run`]
//!   - [`Network::import`], [`CompiledNetwork::run`]
//!     These validate inputs and return [`Result`].
//!
//! # Data layout and shapes
//!
//! - Scalars are `f64`.
//! - Layer weights are row-major with shape `(out_dim, in_dim)`.
//! - [`Dataset`] stores encoded samples contiguously in row-major layout.
//!
//! # Logging
//!
//! Progress and lifecycle messages go through the [`log`] facade. Install a
//! logger (e.g. `env_logger`) and set `TrainConfig::log_period` to see them.
//!
//! # Quick start
//!
//! ```rust
//! use sigmoid_mlp::{Example, NetworkBuilder, TrainConfig};
//!
//! # fn main() -> sigmoid_mlp::Result<()> {
//! let data = vec![
//!     Example::new([0.0, 0.0], [0.0]),
//!     Example::new([0.0, 1.0], [0.0]),
//!     Example::new([1.0, 0.0], [0.0]),
//!     Example::new([1.0, 1.0], [1.0]),
//! ];
//!
//! let mut net = NetworkBuilder::new().seed(0).build()?;
//! let report = net.train(&data, &TrainConfig::default())?;
//! assert!(report.error <= 0.005);
//!
//! let stats = net.evaluate(&data)?;
//! assert_eq!(stats.binary.unwrap().accuracy, 1.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Keyed records
//!
//! ```rust
//! use sigmoid_mlp::{Example, NetworkBuilder, Record, TrainConfig, Value};
//!
//! # fn main() -> sigmoid_mlp::Result<()> {
//! let data = vec![
//!     Example::new(Record::from([("r", 1.0)]), Record::from([("warm", 1.0)])),
//!     Example::new(Record::from([("b", 1.0)]), Record::from([("cool", 1.0)])),
//! ];
//!
//! let mut net = NetworkBuilder::new().seed(0).build()?;
//! net.train(&data, &TrainConfig::default())?;
//!
//! let out = net.run(&Value::Keyed(Record::from([("r", 1.0)])))?;
//! let warm = out.as_record().and_then(|r| r.get("warm")).copied();
//! assert!(warm.unwrap() > 0.5);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod compiled;
pub mod data;
pub mod error;
pub mod keyed;
pub mod layer;
pub mod lookup;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod serde_model;
pub mod stream;
pub mod train;

pub use builder::{NetworkBuilder, NetworkConfig};
pub use compiled::CompiledNetwork;
pub use data::{Dataset, Example, TrainingData, Value};
pub use error::{Error, Result};
pub use keyed::{KeyedMap, Record};
pub use layer::Layer;
pub use lookup::Lookup;
pub use metrics::{BinaryStats, EvalReport, Misclassification};
pub use network::{Network, Scratch};
pub use serde_model::{ExportedNetwork, UnitParams};
pub use stream::TrainStream;
pub use train::{TrainConfig, TrainReport, TrainStatus};
