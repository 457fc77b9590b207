//! Statement classification.
//!
//! Checks run in order and the first match wins. Later checks
//! assume earlier ones didn't match: sharding rules are only
//! consulted once TCL, DDL, DAL and DCL are out of the way.

use super::RoutingEngine;
use crate::frontend::router::condition::ShardingConditions;
use crate::frontend::router::parser::{DalKind, Statement};
use crate::rule::ShardingRule;

impl RoutingEngine {
    /// Pick the engine for a statement.
    pub fn new(
        rule: &ShardingRule,
        statement: &Statement,
        conditions: &ShardingConditions,
    ) -> Self {
        let tables = statement.tables();
        let owned = || tables.iter().map(|t| t.to_string()).collect::<Vec<_>>();

        match statement {
            Statement::Tcl => return Self::DatabaseBroadcast,
            Statement::Ddl(_) => return Self::TableBroadcast { tables: owned() },
            Statement::Dal(dal) => return Self::dal(rule, dal.kind, &tables),
            Statement::Dcl(_) => return Self::dcl(&tables),
            _ => (),
        }

        if rule.is_all_in_default_data_source(&tables) {
            return Self::Default { tables: owned() };
        }

        if rule.is_all_broadcast_tables(&tables) {
            return if statement.is_select() {
                Self::Unicast { tables: owned() }
            } else {
                Self::DatabaseBroadcast
            };
        }

        if tables.is_empty() && rule.default_data_source().is_some() {
            return Self::Default { tables: vec![] };
        }

        if conditions.is_always_false() || tables.is_empty() || !rule.table_rule_exists(&tables) {
            return Self::Unicast { tables: owned() };
        }

        let sharding = rule.sharding_logic_tables(&tables);
        match sharding.first() {
            Some(table) if sharding.len() == 1 || rule.is_all_binding_tables(&sharding) => {
                Self::Standard {
                    table: table.to_string(),
                }
            }
            _ => Self::Complex { tables: owned() },
        }
    }

    fn dal(rule: &ShardingRule, kind: DalKind, tables: &[&str]) -> Self {
        let owned = || tables.iter().map(|t| t.to_string()).collect::<Vec<_>>();

        match kind {
            DalKind::Use => Self::Ignore,
            DalKind::Set | DalKind::ResetParameter | DalKind::ShowDatabases => {
                Self::DatabaseBroadcast
            }
            _ if !tables.is_empty()
                && !rule.table_rule_exists(tables)
                && rule.default_data_source().is_some() =>
            {
                Self::Default { tables: owned() }
            }
            _ if !tables.is_empty() => Self::Unicast { tables: owned() },
            _ => Self::DataSourceGroupBroadcast,
        }
    }

    fn dcl(tables: &[&str]) -> Self {
        if !tables.is_empty() && tables.iter().all(|table| *table != "*") {
            Self::TableBroadcast {
                tables: tables.iter().map(|t| t.to_string()).collect(),
            }
        } else {
            Self::MasterInstanceBroadcast
        }
    }
}
