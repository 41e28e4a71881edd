//! Configuration rendering subsystem.
//!
//! # Data Flow
//! ```text
//! POST /{namespace}/{vendor}/{style}
//!     → selector.rs (StyleSelector, validated tokens)
//!     → renderer.rs (compiled set from templates/{vendor}/{style}/router.hbs)
//!     → router configuration text or JSON
//! ```

pub mod renderer;
pub mod selector;

pub use renderer::TemplateRenderer;
pub use selector::StyleSelector;
