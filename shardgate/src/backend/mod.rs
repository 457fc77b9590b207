//! Execution side: load balancing, execution engine and result merging.

pub mod execute;
pub mod lb;
pub mod merge;

pub use execute::ExecuteEngine;
pub use lb::LoadBalanceAlgorithm;
