//! Column consistency across merged row sources.

use super::{Error, QueryResult};

#[derive(Debug, Default)]
pub(super) struct Validator {
    expected_column_count: Option<usize>,
}

impl Validator {
    /// Check a row source against the first one seen.
    pub(super) fn validate(&mut self, result: &dyn QueryResult) -> Result<(), Error> {
        let actual = result.column_count();

        match self.expected_column_count {
            None => {
                self.expected_column_count = Some(actual);
                Ok(())
            }
            Some(expected) if expected != actual => {
                Err(Error::InconsistentColumnCount { expected, actual })
            }
            Some(_) => Ok(()),
        }
    }
}
