//! Request routing.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path)
//!     → router.rs (routes tried highest priority first)
//!     → matcher.rs (host and segment-aware path prefix)
//!     → matched Route: backend group + upstream path
//!
//! On config reload:
//!     RouteConfig[] → Router::from_config → swapped into server state
//! ```
//!
//! # Design Decisions
//! - A route for `/services/{service}/{instance}` strips that prefix, so the
//!   instance sees its own `/v3/api-docs`
//! - Equal priorities keep configuration order

pub mod matcher;
pub mod router;

pub use router::{Route, Router};
