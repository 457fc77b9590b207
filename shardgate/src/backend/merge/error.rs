use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("inconsistent column count: expected {expected}, got {actual}")]
    InconsistentColumnCount { expected: usize, actual: usize },

    #[error("column index {0} out of range")]
    ColumnIndex(usize),

    #[error("cursor is not positioned on a row")]
    NoCurrentRow,

    #[error("row source failed: {0}")]
    Source(String),
}
