//! Generated primary keys for INSERT statements.

use serde::Serialize;
use shardgate_types::{Datum, ShardingValue};

use crate::frontend::router::parser::{Insert, TableMetas};
use crate::frontend::router::Error;
use crate::rule::ShardingRule;

/// The key column of an INSERT and its values, either supplied
/// by the statement or generated by the table's key generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedKey {
    pub column: String,
    /// Values are generated, not taken from the statement.
    pub generated: bool,
    pub values: Vec<ShardingValue>,
}

impl GeneratedKey {
    /// Find the generated key for an INSERT, if the table declares one.
    pub fn find(
        rule: &ShardingRule,
        metas: &TableMetas,
        params: &[Datum],
        insert: &Insert,
    ) -> Result<Option<Self>, Error> {
        let column = match rule.find_generate_key_column(&insert.table) {
            Some(column) => column.to_string(),
            None => return Ok(None),
        };

        let index = match column_index(metas, insert, &column) {
            Some(index) => index,
            None => {
                return Ok(Some(Self {
                    column,
                    generated: true,
                    values: vec![],
                }))
            }
        };

        let mut values = vec![];
        for row in &insert.values {
            if let Some(expr) = row.get(index) {
                if let Some(value) = expr.value(params)? {
                    values.push(value);
                }
            }
        }

        Ok(Some(Self {
            column,
            generated: false,
            values,
        }))
    }
}

/// Columns the INSERT values follow: the explicit column list,
/// or every column of the table.
pub(crate) fn insert_columns(metas: &TableMetas, insert: &Insert) -> Vec<String> {
    match insert.columns.as_ref().filter(|c| !c.is_empty()) {
        Some(columns) => columns.clone(),
        None => metas
            .columns(&insert.table)
            .map(|c| c.to_vec())
            .unwrap_or_default(),
    }
}

// Position of the key column among the INSERT values, if present.
fn column_index(metas: &TableMetas, insert: &Insert, column: &str) -> Option<usize> {
    match insert.columns.as_ref().filter(|c| !c.is_empty()) {
        Some(columns) => columns.iter().position(|c| c.eq_ignore_ascii_case(column)),
        None => {
            let columns = metas.columns(&insert.table)?;
            let width = insert.values.first().map(|row| row.len()).unwrap_or(0);
            if columns.len() == width {
                columns.iter().position(|c| c.eq_ignore_ascii_case(column))
            } else {
                None
            }
        }
    }
}
