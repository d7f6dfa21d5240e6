//! Hop-by-hop header removal for proxied responses.

use async_trait::async_trait;
use axum::http::header::{self, HeaderName};

use crate::filter::{Exchange, FilterError, GlobalFilter};

const HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Strips headers that only apply to the downstream connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct HopByHopHeadersFilter;

#[async_trait]
impl GlobalFilter for HopByHopHeadersFilter {
    fn name(&self) -> &'static str {
        "hop-by-hop-headers"
    }

    fn order(&self) -> i32 {
        0
    }

    async fn filter(&self, mut exchange: Exchange) -> Result<Exchange, FilterError> {
        let headers = &mut exchange.response.parts.headers;
        for name in &HOP_BY_HOP {
            headers.remove(name);
        }
        headers.remove("keep-alive");
        headers.remove("proxy-connection");
        Ok(exchange)
    }
}
