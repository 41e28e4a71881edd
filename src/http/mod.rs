//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, request span)
//!     → handlers.rs   GET /api/{ix,ixlan,netixlan,net}[/{id}] → registry
//!     → submit.rs     POST /{namespace}/{vendor}/{style}/{asn?}
//!                         → peering (merge) → render
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;
pub mod submit;

pub use request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
