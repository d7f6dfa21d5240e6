//! API gateway that rewrites the `servers` entry of OpenAPI documents
//! served by downstream service instances.

pub mod config;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use filter::{FilterChain, ModifyServersOpenApiFilter, ServersInterceptor};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
