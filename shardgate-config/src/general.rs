use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Settings that apply to the whole process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct General {
    /// Number of threads in the shared execution pool.
    ///
    /// _Default:_ number of CPUs
    #[serde(default = "General::executor_size")]
    pub executor_size: usize,

    /// Maximum number of execution groups opened per data source
    /// for a single statement.
    ///
    /// _Default:_ `1`
    #[serde(default = "General::max_connections_per_query")]
    pub max_connections_per_query: usize,

    /// Log every routed statement with its routing units.
    #[serde(default = "General::show_sql")]
    pub show_sql: bool,

    #[serde(default = "General::log_format")]
    pub log_format: LogFormat,
}

impl Default for General {
    fn default() -> Self {
        Self {
            executor_size: Self::executor_size(),
            max_connections_per_query: Self::max_connections_per_query(),
            show_sql: Self::show_sql(),
            log_format: Self::log_format(),
        }
    }
}

impl General {
    fn env_or_default<T: FromStr>(env_var: &str, default: T) -> T {
        env::var(env_var)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn env_bool_or_default(env_var: &str, default: bool) -> bool {
        env::var(env_var)
            .ok()
            .and_then(|v| match v.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            })
            .unwrap_or(default)
    }

    fn executor_size() -> usize {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);
        Self::env_or_default("SHARDGATE_EXECUTOR_SIZE", cpus)
    }

    fn max_connections_per_query() -> usize {
        Self::env_or_default("SHARDGATE_MAX_CONNECTIONS_PER_QUERY", 1)
    }

    fn show_sql() -> bool {
        Self::env_bool_or_default("SHARDGATE_SHOW_SQL", false)
    }

    fn log_format() -> LogFormat {
        Self::env_or_default("SHARDGATE_LOG_FORMAT", LogFormat::default())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
