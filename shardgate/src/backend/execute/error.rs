use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("statement failed on \"{data_source}\": {message}")]
    Statement {
        data_source: String,
        message: String,
    },

    #[error("execution task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("execution engine is shut down")]
    Shutdown,

    #[error("failed to start worker pool: {0}")]
    Runtime(#[from] std::io::Error),
}

impl Error {
    pub fn statement(data_source: &str, message: impl ToString) -> Self {
        Self::Statement {
            data_source: data_source.to_string(),
            message: message.to_string(),
        }
    }
}
