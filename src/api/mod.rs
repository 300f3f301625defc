//! API layer
//!
//! HTTP handlers for:
//! - Story CRUD
//! - Metrics (Prometheus)

pub mod metrics;
mod stories;

pub use metrics::metrics_router;
pub use stories::stories_router;
