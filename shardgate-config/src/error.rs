//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Toml(#[from] toml::de::Error),

    #[error("config parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("{0} is required")]
    Required(&'static str),

    #[error("property \"{key}\" has invalid value \"{value}\"")]
    InvalidProperty { key: String, value: String },

    #[error("logic table \"{0}\" is configured more than once")]
    DuplicateTable(String),

    #[error("{context} refers to unknown logic table \"{table}\"")]
    UnknownTable {
        context: &'static str,
        table: String,
    },

    #[error("master/slave rule \"{0}\" has no slaves")]
    NoSlaves(String),
}

impl Error {
    /// Attach the line number to a TOML parse error.
    pub fn config(source: &str, err: toml::de::Error) -> Self {
        let line = err
            .span()
            .map(|span| source[..span.start.min(source.len())].matches('\n').count() + 1)
            .unwrap_or(0);

        Self::Parse {
            line,
            message: err.message().to_string(),
        }
    }
}
