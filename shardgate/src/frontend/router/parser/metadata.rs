use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Column lists of known tables, keyed by lowercase table name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableMetas {
    tables: HashMap<String, Vec<String>>,
}

impl TableMetas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, table: &str, columns: &[&str]) -> &mut Self {
        self.tables.insert(
            table.to_lowercase(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables.get(&table.to_lowercase()).map(|c| c.as_slice())
    }

    pub fn contains_column(&self, table: &str, column: &str) -> bool {
        self.columns(table)
            .map(|columns| columns.iter().any(|c| c.eq_ignore_ascii_case(column)))
            .unwrap_or(false)
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.tables.contains_key(&table.to_lowercase())
    }
}
