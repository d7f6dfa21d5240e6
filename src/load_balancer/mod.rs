//! Service instance selection.
//!
//! # Data Flow
//! ```text
//! Route matched → backend_group identified
//!     → pool.rs (get instances of the group)
//!     → round_robin.rs (rotate through instances with free capacity)
//!     → backend.rs (connection guard held for the request)
//!     → Return guard or None (503)
//! ```
//!
//! # Design Decisions
//! - Selection strategy is stateless apart from its rotation counter
//! - Saturated instances are skipped, not queued

use std::sync::Arc;

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::{Backend, BackendConnectionGuard};
pub use pool::BackendManager;

/// Strategy picking one backend out of a group.
pub trait LoadBalancer: Send + Sync {
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>>;
}
