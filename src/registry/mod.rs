//! Exchange registry subsystem.
//!
//! # Data Flow
//! ```text
//! GET /api/{ix,ixlan,netixlan,net}
//!     → service.rs (Registry: resource-specific query)
//!     → cache.rs (SnapshotCache: bytes, loaded from disk once)
//!     → decode into types.rs records (per request, outside the lock)
//!     → query.rs (QueryEngine: predicates from path / query string)
//!     → Envelope { data: [...] }
//! ```
//!
//! # Design Decisions
//! - Cache is constructed once at startup and shared via Arc
//! - Snapshots are immutable for the lifetime of the process
//! - No match is an empty collection, never an error

pub mod cache;
pub mod query;
pub mod service;
pub mod types;

pub use cache::SnapshotCache;
pub use query::QueryEngine;
pub use service::Registry;
pub use types::{Envelope, Ix, IxLan, Net, NetIxLan, Record, ResourceKind};
