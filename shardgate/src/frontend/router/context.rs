use shardgate_types::ShardingValue;

use super::{Error, HintManager};

/// State of one logical unit of work, e.g. a transaction.
///
/// Created by the caller when the unit of work starts and passed to
/// every statement routed inside it. Reads stick to the master once
/// it has been written to, and generated keys accumulate across
/// statements until the context is cleared.
#[derive(Debug, Default)]
pub struct RouterContext {
    hint: Option<HintManager>,
    master_visited: bool,
    generated_values: Vec<ShardingValue>,
}

impl RouterContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start hinting. Only one hint can be active at a time.
    pub fn hint_manager(&mut self) -> Result<&mut HintManager, Error> {
        if self.hint.is_some() {
            return Err(Error::HintActive);
        }
        Ok(self.hint.insert(HintManager::default()))
    }

    pub fn hint(&self) -> Option<&HintManager> {
        self.hint.as_ref()
    }

    pub fn clear_hint(&mut self) {
        self.hint = None;
    }

    pub fn is_master_visited(&self) -> bool {
        self.master_visited
    }

    pub fn set_master_visited(&mut self) {
        self.master_visited = true;
    }

    pub fn clear_master_visited(&mut self) {
        self.master_visited = false;
    }

    /// Keys generated so far in this unit of work.
    pub fn generated_values(&self) -> &[ShardingValue] {
        &self.generated_values
    }

    pub(crate) fn add_generated_values(&mut self, values: &[ShardingValue]) {
        self.generated_values.extend_from_slice(values);
    }

    /// End of the unit of work.
    pub fn clear(&mut self) {
        self.hint = None;
        self.master_visited = false;
        self.generated_values.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_one_hint_at_a_time() {
        let mut context = RouterContext::new();
        context.hint_manager().unwrap().set_master_route_only();
        assert!(matches!(context.hint_manager(), Err(Error::HintActive)));
        assert!(context.hint().unwrap().is_master_route_only());

        context.clear_hint();
        assert!(context.hint_manager().is_ok());
    }

    #[test]
    fn test_clear() {
        let mut context = RouterContext::new();
        context.set_master_visited();
        context.add_generated_values(&[ShardingValue::Integer(1)]);
        context.hint_manager().unwrap();

        context.clear();
        assert!(!context.is_master_visited());
        assert!(context.generated_values().is_empty());
        assert!(context.hint().is_none());
    }
}
