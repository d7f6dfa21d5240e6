//! Response filters.
//!
//! # Data Flow
//! ```text
//! downstream response (hyper body)
//!     → GatewayResponse { parts, BodySource::Streaming }
//!     → chain.rs (global filters, ascending order)
//!         → openapi.rs   (order -1, rewrites `servers` of API docs)
//!         → headers.rs   (order 0, strips hop-by-hop headers)
//!     → Response sent to client, or FilterError → error response
//! ```
//!
//! # Design Decisions
//! - The body shape is decided once at the boundary (`BodySource`), filters
//!   never inspect runtime types
//! - Filters own the exchange while they run and hand it back

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::response::Parts;
use axum::http::Response;

pub mod chain;
pub mod error;
pub mod gzip;
pub mod headers;
pub mod interceptor;
pub mod openapi;

pub use chain::FilterChain;
pub use error::FilterError;
pub use headers::HopByHopHeadersFilter;
pub use interceptor::{InterceptorState, RouteContext, ServersInterceptor};
pub use openapi::ModifyServersOpenApiFilter;

/// Shape of a response body as delivered by the host.
#[derive(Debug)]
pub enum BodySource {
    /// Chunks still arriving from a downstream connection.
    Streaming(Body),
    /// Body already held as one buffer.
    Singleton(Bytes),
}

impl BodySource {
    pub fn into_body(self) -> Body {
        match self {
            BodySource::Streaming(body) => body,
            BodySource::Singleton(bytes) => Body::from(bytes),
        }
    }
}

/// A response travelling through the filter chain.
#[derive(Debug)]
pub struct GatewayResponse {
    pub parts: Parts,
    pub body: BodySource,
}

impl GatewayResponse {
    /// Wrap a response whose body is still being received.
    pub fn streaming(response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            parts,
            body: BodySource::Streaming(body),
        }
    }

    /// Wrap a response whose body is already complete.
    pub fn singleton(parts: Parts, bytes: Bytes) -> Self {
        Self {
            parts,
            body: BodySource::Singleton(bytes),
        }
    }

    pub fn into_response(self) -> Response<Body> {
        Response::from_parts(self.parts, self.body.into_body())
    }
}

/// Inbound request path paired with the response being returned for it.
#[derive(Debug)]
pub struct Exchange {
    pub path: String,
    pub response: GatewayResponse,
}

impl Exchange {
    pub fn new(path: impl Into<String>, response: GatewayResponse) -> Self {
        Self {
            path: path.into(),
            response,
        }
    }
}

/// A filter applied to every proxied response.
#[async_trait]
pub trait GlobalFilter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Position in the chain; lower values run first.
    fn order(&self) -> i32;

    async fn filter(&self, exchange: Exchange) -> Result<Exchange, FilterError>;
}
