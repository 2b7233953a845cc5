//! Symbolic key lookup tables.
//!
//! A `Lookup` maps feature or label names to dense vector positions so keyed
//! records can flow through the numeric core. Indices are a dense permutation
//! of `0..len` assigned in first-seen order across all records scanned.
//!
//! Once a network has built a table it is frozen: later records are encoded
//! against it as-is, so keys missing from a record read as `0.0` and keys the
//! table has never seen are dropped.

use std::collections::HashMap;

use crate::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    keys: Vec<String>,
    index: HashMap<String, usize>,
}

impl Lookup {
    /// Build a table from every key of every record, in first-seen order.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        Self::from_keys(records.into_iter().flat_map(|r| r.keys()))
    }

    /// Build a table from a key sequence. Duplicate keys keep their first index.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lookup = Self {
            keys: Vec::new(),
            index: HashMap::new(),
        };
        for key in keys {
            let key = key.as_ref();
            if !lookup.index.contains_key(key) {
                lookup.index.insert(key.to_owned(), lookup.keys.len());
                lookup.keys.push(key.to_owned());
            }
        }
        lookup
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in index order.
    #[inline]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    #[inline]
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Encode `record` as a dense vector of width `self.len()`.
    pub fn to_vector(&self, record: &Record) -> Vec<f64> {
        let mut out = vec![0.0; self.len()];
        self.to_vector_into(record, &mut out);
        out
    }

    /// Non-allocating variant of [`Lookup::to_vector`].
    ///
    /// Shape contract: `out.len() == self.len()`.
    pub fn to_vector_into(&self, record: &Record, out: &mut [f64]) {
        assert_eq!(
            out.len(),
            self.len(),
            "out len {} does not match lookup len {}",
            out.len(),
            self.len()
        );

        out.fill(0.0);
        for (key, &value) in record.iter() {
            if let Some(idx) = self.index_of(key) {
                out[idx] = value;
            }
        }
    }

    /// Decode a dense vector back into a record keyed in index order.
    pub fn to_record(&self, vector: &[f64]) -> Record {
        assert_eq!(
            vector.len(),
            self.len(),
            "vector len {} does not match lookup len {}",
            vector.len(),
            self.len()
        );

        self.keys
            .iter()
            .zip(vector)
            .map(|(k, &v)| (k.as_str(), v))
            .collect()
    }
}
