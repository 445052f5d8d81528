use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::local_store::{LocalStore, StoreError};

pub const COUNTS_KEY: &str = "analytics:counts";

const MAX_POPULARITY_BOOST: f64 = 5.0;

/// Open counts per counter key (`link:<label>`, `go:<key>`, `cmd:<text>`,
/// `go-search:<query>`). Counts only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageCounts {
    counts: HashMap<String, u64>,
}

impl UsageCounts {
    pub fn load(store: &LocalStore) -> Self {
        store.read_json_or_default(COUNTS_KEY)
    }

    pub fn save(&self, store: &LocalStore) -> Result<(), StoreError> {
        store.write_json(COUNTS_KEY, self)
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, key: &str) -> u64 {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Increments one counter in the persisted map and returns the new count.
pub fn record_open(store: &LocalStore, key: &str) -> Result<u64, StoreError> {
    let mut counts = UsageCounts::load(store);
    let count = counts.increment(key);
    counts.save(store)?;
    Ok(count)
}

pub fn popularity_boost(count: u64) -> f64 {
    (count as f64 / 5.0).min(MAX_POPULARITY_BOOST)
}
