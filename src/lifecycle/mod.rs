//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown_signal() resolves
//!
//! Shutdown (shutdown.rs):
//!     trigger() → every subscriber (server, background tasks) stops
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accepting, drain in-flight requests, exit

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
