//! Request middleware.

pub mod metrics;

pub use metrics::record_metrics;
