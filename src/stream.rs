//! Batched training from a record stream.
//!
//! `TrainStream` is a synchronous sink: records are pushed one at a time, and
//! whenever `batch_size` of them have accumulated (or on `flush`/`end`) the
//! batch is handed to [`Network::train`]. The first batch trains with the
//! caller's `keep_parameters`; later batches always continue from the current
//! parameters. Lookup tables are built from the first batch and then frozen.

use log::debug;

use crate::{Error, Example, Network, Result, TrainConfig, TrainReport};

pub struct TrainStream<'a> {
    network: &'a mut Network,
    config: TrainConfig,
    batch_size: usize,
    buffer: Vec<Example>,
    batches: usize,
    last_report: Option<TrainReport>,
}

impl<'a> TrainStream<'a> {
    pub fn new(network: &'a mut Network, config: TrainConfig, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidConfig("batch size must be > 0".to_owned()));
        }
        config.validate()?;
        Ok(Self {
            network,
            config,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            batches: 0,
            last_report: None,
        })
    }

    /// Buffer one example, training if the batch is now full.
    pub fn write(&mut self, example: Example) -> Result<Option<TrainReport>> {
        self.buffer.push(example);
        if self.buffer.len() >= self.batch_size {
            return self.flush();
        }
        Ok(None)
    }

    /// Train on whatever is buffered. Returns `None` if the buffer is empty.
    pub fn flush(&mut self) -> Result<Option<TrainReport>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let mut cfg = self.config.clone();
        cfg.keep_parameters |= self.batches > 0;
        debug!(
            "training stream batch {} with {} examples",
            self.batches,
            self.buffer.len()
        );

        // A rejected batch is dropped so later batches can still train.
        let batch = std::mem::take(&mut self.buffer);
        let report = self.network.train(&batch, &cfg)?;
        self.batches += 1;
        self.last_report = Some(report);
        Ok(Some(report))
    }

    /// Flush and return the report of the last batch trained, if any.
    pub fn end(mut self) -> Result<Option<TrainReport>> {
        self.flush()?;
        Ok(self.last_report)
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn batches_trained(&self) -> usize {
        self.batches
    }
}
