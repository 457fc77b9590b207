use rand::Rng;

use super::LoadBalanceAlgorithm;

/// Uniform random choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct Random;

impl LoadBalanceAlgorithm for Random {
    fn data_source(&self, _name: &str, _master: &str, slaves: &[String]) -> Option<String> {
        if slaves.is_empty() {
            return None;
        }

        let index = rand::rng().random_range(0..slaves.len());
        slaves.get(index).cloned()
    }
}
