//! Merging per-shard row sources into one logical cursor.

use shardgate_types::Datum;
use tracing::trace;

use super::execute::ConnectionMode;

pub mod error;
pub mod result;
mod validator;

pub use error::Error;
pub use result::{MemoryQueryResult, QueryResult, Row, StreamQueryResult};

use validator::Validator;

/// Concatenation of row sources, in the order they were given.
///
/// Exhausted sources are skipped, including ones that never had a row.
pub struct IteratorMergedResult {
    results: Vec<Box<dyn QueryResult>>,
    current: usize,
}

impl IteratorMergedResult {
    pub fn new(results: Vec<Box<dyn QueryResult>>) -> Result<Self, Error> {
        let mut validator = Validator::default();
        for result in &results {
            validator.validate(result.as_ref())?;
        }

        Ok(Self {
            results,
            current: 0,
        })
    }

    /// Advance to the next row across all sources.
    pub fn next(&mut self) -> Result<bool, Error> {
        while let Some(result) = self.results.get_mut(self.current) {
            if result.next()? {
                return Ok(true);
            }
            self.current += 1;
            trace!("merged cursor moved to source {}", self.current);
        }

        Ok(false)
    }

    pub fn value(&self, index: usize) -> Result<&Datum, Error> {
        self.results
            .get(self.current)
            .ok_or(Error::NoCurrentRow)?
            .value(index)
    }

    pub fn column_count(&self) -> usize {
        self.results
            .first()
            .map(|result| result.column_count())
            .unwrap_or(0)
    }

    pub fn column_label(&self, index: usize) -> Result<&str, Error> {
        self.results
            .first()
            .ok_or(Error::ColumnIndex(index))?
            .column_label(index)
    }

    /// Read the current row.
    pub fn row(&self) -> Result<Row, Error> {
        (0..self.column_count())
            .map(|i| self.value(i).cloned())
            .collect()
    }
}

impl std::fmt::Debug for IteratorMergedResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IteratorMergedResult")
            .field("sources", &self.results.len())
            .field("current", &self.current)
            .finish()
    }
}

/// Prepare a row source for merging.
///
/// Sources read over shared connections are materialized,
/// everything else streams.
pub fn prepare(
    mut result: Box<dyn QueryResult>,
    mode: ConnectionMode,
) -> Result<Box<dyn QueryResult>, Error> {
    match mode {
        ConnectionMode::ConnectionStrictly => {
            Ok(Box::new(MemoryQueryResult::load(result.as_mut())?))
        }
        ConnectionMode::MemoryStrictly => Ok(result),
    }
}
