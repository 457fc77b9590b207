//! Per-shard row sources.

use std::collections::VecDeque;

use shardgate_types::Datum;

use super::Error;

pub type Row = Vec<Datum>;

/// Forward-only, single-pass row source.
pub trait QueryResult: Send {
    /// Move to the next row. Returns `false` once exhausted.
    fn next(&mut self) -> Result<bool, Error>;

    /// Value of a column in the current row.
    fn value(&self, index: usize) -> Result<&Datum, Error>;

    fn columns(&self) -> &[String];

    fn column_count(&self) -> usize {
        self.columns().len()
    }

    fn column_label(&self, index: usize) -> Result<&str, Error> {
        self.columns()
            .get(index)
            .map(String::as_str)
            .ok_or(Error::ColumnIndex(index))
    }
}

fn value(row: Option<&Row>, index: usize) -> Result<&Datum, Error> {
    row.ok_or(Error::NoCurrentRow)?
        .get(index)
        .ok_or(Error::ColumnIndex(index))
}

/// Rows materialized in memory.
///
/// Used when the connection that produced them is released
/// before the rows are consumed.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueryResult {
    columns: Vec<String>,
    rows: VecDeque<Row>,
    current: Option<Row>,
}

impl MemoryQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows: rows.into(),
            current: None,
        }
    }

    /// Drain another row source into memory.
    pub fn load(source: &mut dyn QueryResult) -> Result<Self, Error> {
        let columns = source.columns().to_vec();
        let mut rows = vec![];

        while source.next()? {
            let row = (0..columns.len())
                .map(|i| source.value(i).cloned())
                .collect::<Result<Row, Error>>()?;
            rows.push(row);
        }

        Ok(Self::new(columns, rows))
    }

    /// Rows not consumed yet.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl QueryResult for MemoryQueryResult {
    fn next(&mut self) -> Result<bool, Error> {
        self.current = self.rows.pop_front();
        Ok(self.current.is_some())
    }

    fn value(&self, index: usize) -> Result<&Datum, Error> {
        value(self.current.as_ref(), index)
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Rows read lazily from the underlying source.
pub struct StreamQueryResult<S> {
    columns: Vec<String>,
    source: S,
    current: Option<Row>,
}

impl<S> StreamQueryResult<S>
where
    S: Iterator<Item = Result<Row, Error>> + Send,
{
    pub fn new(columns: Vec<String>, source: S) -> Self {
        Self {
            columns,
            source,
            current: None,
        }
    }
}

impl<S> std::fmt::Debug for StreamQueryResult<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamQueryResult")
            .field("columns", &self.columns)
            .field("current", &self.current)
            .finish()
    }
}

impl<S> QueryResult for StreamQueryResult<S>
where
    S: Iterator<Item = Result<Row, Error>> + Send,
{
    fn next(&mut self) -> Result<bool, Error> {
        self.current = self.source.next().transpose()?;
        Ok(self.current.is_some())
    }

    fn value(&self, index: usize) -> Result<&Datum, Error> {
        value(self.current.as_ref(), index)
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }
}
