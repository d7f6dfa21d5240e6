//! Logging and metrics.
//!
//! # Data Flow
//! ```text
//! proxy handler, filters
//!     → logging.rs (tracing events, request span carries x-request-id)
//!     → metrics.rs (request counters and latency, OpenAPI rewrite outcomes)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Prometheus scrape endpoint, when enabled
//! ```

pub mod logging;
pub mod metrics;
