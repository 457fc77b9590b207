use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] shardgate_config::Error),

    #[error("worker id must be between 0 and 1023, got {0}")]
    WorkerId(u64),

    #[error("max vibration offset must be between 0 and 4095, got {0}")]
    VibrationOffset(u64),

    #[error(
        "clock is moving backwards, last time is {last} milliseconds, current time is {current} milliseconds"
    )]
    ClockBackwards { last: u64, current: u64 },

    #[error("clock reads {0}, which is before the snowflake epoch")]
    BeforeEpoch(u64),

    #[error("snowflake timestamp overflow: {0}")]
    TimestampOverflow(u64),
}
