use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

use super::LoadBalanceAlgorithm;

/// Rotate through slaves, one counter per logical data source.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counters: DashMap<String, AtomicUsize>,
}

impl LoadBalanceAlgorithm for RoundRobin {
    fn data_source(&self, name: &str, _master: &str, slaves: &[String]) -> Option<String> {
        if slaves.is_empty() {
            return None;
        }

        let position = match self.counters.get(name) {
            Some(counter) => counter.fetch_add(1, Ordering::Relaxed),
            None => self
                .counters
                .entry(name.to_string())
                .or_default()
                .fetch_add(1, Ordering::Relaxed),
        };

        slaves.get(position % slaves.len()).cloned()
    }
}
