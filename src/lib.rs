//! Internet exchange peering configuration generator.
//!
//! Serves a registry surface (`/api/ix`, `/api/ixlan`, `/api/netixlan`,
//! `/api/net`) from on-disk snapshots and turns submitted peer lists into
//! vendor router configuration.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod peering;
pub mod registry;
pub mod render;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
