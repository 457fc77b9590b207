//! Value conversion errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("sharding value cannot be null")]
    Null,

    #[error("{0} cannot be used as a sharding value")]
    NotShardable(&'static str),

    #[error("numeric {0} is not an integer")]
    NotInteger(String),
}
