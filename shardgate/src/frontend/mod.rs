//! Statement routing.

pub mod router;

pub use router::{Router, RouterContext, SqlRouteResult};
