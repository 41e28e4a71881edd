//! Peer merge subsystem.
//!
//! # Data Flow
//! ```text
//! POST body (JSON)
//!     → types.rs (ExchangeConfig with peers_configured)
//!     → merge.rs (MergeWorker, one task per requested peer)
//!         → client.rs (RegistryClient: HTTP or in-process)
//!     → ExchangeConfig with peersready in submission order
//!     → render subsystem
//! ```

pub mod client;
pub mod merge;
pub mod types;

pub use client::{HttpRegistryClient, LocalRegistryClient, RegistryClient};
pub use merge::MergeWorker;
pub use types::{parse_submission, ExchangeConfig, ExchangePeer};
