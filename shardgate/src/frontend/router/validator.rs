//! Statements that can't be routed correctly are rejected before routing.

use shardgate_types::{Datum, ShardingValue};

use super::parser::{Insert, Operator, Statement, Update};
use super::Error;
use crate::rule::ShardingRule;

pub fn validate(rule: &ShardingRule, statement: &Statement, params: &[Datum]) -> Result<(), Error> {
    match statement {
        Statement::Insert(insert) => validate_insert(rule, insert),
        Statement::Update(update) => validate_update(rule, update, params),
        _ => Ok(()),
    }
}

// Moving a row to another shard isn't something an upsert can do.
fn validate_insert(rule: &ShardingRule, insert: &Insert) -> Result<(), Error> {
    match insert
        .on_duplicate_key_update
        .iter()
        .find(|column| rule.is_sharding_column(column, &insert.table))
    {
        Some(column) => Err(Error::OnDuplicateKeyShardingColumn(column.clone())),
        None => Ok(()),
    }
}

// A sharding column can only be "updated" to the value
// the WHERE clause already pins it to.
fn validate_update(rule: &ShardingRule, update: &Update, params: &[Datum]) -> Result<(), Error> {
    for table in &update.tables {
        for assignment in &update.assignments {
            if !rule.is_sharding_column(&assignment.column, table) {
                continue;
            }

            let assigned = assignment.value.value(params)?;
            let pinned = pinned_value(update, &assignment.column, params)?;

            match (assigned, pinned) {
                (Some(assigned), Some(pinned)) if assigned == pinned => continue,
                _ => {
                    return Err(Error::ShardingKeyUpdate {
                        table: table.clone(),
                        column: assignment.column.clone(),
                    })
                }
            }
        }
    }

    Ok(())
}

fn pinned_value(
    update: &Update,
    column: &str,
    params: &[Datum],
) -> Result<Option<ShardingValue>, Error> {
    for and in &update.filter {
        for predicate in &and.predicates {
            if !predicate.column.eq_ignore_ascii_case(column) {
                continue;
            }
            if let Operator::Eq { ref value } = predicate.operator {
                if let Some(value) = value.value(params)? {
                    return Ok(Some(value));
                }
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontend::router::parser::{AndPredicate, Assignment, Expr, Predicate};
    use crate::rule::test::sharding_rule;

    fn update(column: &str, value: Expr, filter: Vec<Predicate>) -> Statement {
        Statement::Update(Update {
            tables: vec!["t_order".into()],
            assignments: vec![Assignment {
                column: column.into(),
                value,
            }],
            filter: vec![AndPredicate::new(filter)],
        })
    }

    #[test]
    fn test_update_sharding_column() {
        let rule = sharding_rule();

        let statement = update("status", "paid".into(), vec![]);
        assert!(validate(&rule, &statement, &[]).is_ok());

        let statement = update("user_id", 2_i64.into(), vec![]);
        assert!(matches!(
            validate(&rule, &statement, &[]),
            Err(Error::ShardingKeyUpdate { .. })
        ));

        // Same value as in the WHERE clause is allowed.
        let statement = update(
            "user_id",
            Expr::Param(0),
            vec![Predicate::eq(None, "user_id", 2_i64.into())],
        );
        assert!(validate(&rule, &statement, &[Datum::Bigint(2)]).is_ok());
        assert!(validate(&rule, &statement, &[Datum::Bigint(3)]).is_err());
    }

    #[test]
    fn test_on_duplicate_key_update() {
        let rule = sharding_rule();
        let mut insert = Insert {
            table: "t_order".into(),
            columns: Some(vec!["user_id".into(), "status".into()]),
            values: vec![vec![1_i64.into(), "new".into()]],
            on_duplicate_key_update: vec!["status".into()],
        };
        assert!(validate(&rule, &Statement::Insert(insert.clone()), &[]).is_ok());

        insert.on_duplicate_key_update.push("order_id".into());
        assert!(matches!(
            validate(&rule, &Statement::Insert(insert), &[]),
            Err(Error::OnDuplicateKeyShardingColumn(column)) if column == "order_id"
        ));
    }
}
