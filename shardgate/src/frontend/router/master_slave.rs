//! Read/write splitting.

use tracing::trace;

use super::parser::Statement;
use super::{Error, RouterContext, RoutingResult};
use crate::rule::{MasterSlaveRule, ShardingRule};

/// Replaces master/slave group names in a routing result
/// with the physical data source to use.
pub struct MasterSlaveRouter<'a> {
    rule: &'a ShardingRule,
}

impl<'a> MasterSlaveRouter<'a> {
    pub fn new(rule: &'a ShardingRule) -> Self {
        Self { rule }
    }

    pub fn route(
        &self,
        result: RoutingResult,
        statement: &Statement,
        context: &mut RouterContext,
    ) -> Result<RoutingResult, Error> {
        let mut routed = RoutingResult::new();

        for unit in result {
            let group = self
                .rule
                .master_slave_rules()
                .iter()
                .find(|group| group.name().eq_ignore_ascii_case(&unit.data_source));

            match group {
                Some(group) => {
                    let data_source = self.data_source(group, statement, context)?;
                    trace!("{} -> {}", unit.data_source, data_source);
                    routed.push(unit.with_data_source(&data_source));
                }
                None => {
                    routed.push(unit);
                }
            }
        }

        Ok(routed)
    }

    fn data_source(
        &self,
        group: &MasterSlaveRule,
        statement: &Statement,
        context: &mut RouterContext,
    ) -> Result<String, Error> {
        if is_master_route(statement, context) {
            context.set_master_visited();
            return Ok(group.master().to_string());
        }

        group
            .slave()
            .ok_or_else(|| Error::NoSlave(group.name().to_string()))
    }
}

// Writes, locking reads, reads after a write and hinted reads go to the master.
fn is_master_route(statement: &Statement, context: &RouterContext) -> bool {
    statement.contains_lock()
        || !statement.is_select()
        || context.is_master_visited()
        || context
            .hint()
            .map(|hint| hint.is_master_route_only())
            .unwrap_or(false)
}
