//! Rewrites `servers` of OpenAPI documents fetched through service routes.
//!
//! A service instance reachable at `/services/store/store-1` publishes its
//! document at `/v3/api-docs`, listing its internal address as server. When
//! the document is requested as `/services/store/store-1/v3/api-docs` the
//! entry is replaced by `/services/store/store-1` so that "try it out" calls
//! go through the gateway.

use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};

use crate::config::OpenApiConfig;
use crate::filter::gzip;
use crate::filter::interceptor::{InterceptorState, RouteContext, ServersInterceptor};
use crate::filter::{BodySource, Exchange, FilterError, GlobalFilter};
use crate::observability::metrics;

/// Chain position of the rewrite; ahead of all default-ordered filters.
pub const MODIFY_SERVERS_ORDER: i32 = -1;

#[derive(Debug, Clone)]
pub struct ModifyServersOpenApiFilter {
    config: OpenApiConfig,
}

impl ModifyServersOpenApiFilter {
    pub fn new(config: OpenApiConfig) -> Self {
        Self { config }
    }

    /// True for `/<routing_prefix>/<service>/<instance><docs_suffix>`.
    pub fn should_intercept(&self, request_path: &str) -> bool {
        let Some(rest) = request_path
            .strip_prefix('/')
            .and_then(|p| p.strip_prefix(self.config.routing_prefix.as_str()))
            .and_then(|p| p.strip_prefix('/'))
        else {
            return false;
        };
        let Some(instance_path) = rest.strip_suffix(self.config.docs_suffix.as_str()) else {
            return false;
        };

        let mut segments = instance_path.split('/');
        matches!(
            (segments.next(), segments.next(), segments.next()),
            (Some(service), Some(instance), None) if !service.is_empty() && !instance.is_empty()
        )
    }

    /// Build the interceptor for a response to `request_path`.
    pub fn create_interceptor(&self, request_path: &str, headers: &HeaderMap) -> ServersInterceptor {
        ServersInterceptor::new(
            RouteContext::from_request_path(request_path, &self.config.docs_suffix),
            headers,
            self.config.server_description.clone(),
            self.config.max_document_bytes,
        )
    }
}

impl Default for ModifyServersOpenApiFilter {
    fn default() -> Self {
        Self::new(OpenApiConfig::default())
    }
}

#[async_trait]
impl GlobalFilter for ModifyServersOpenApiFilter {
    fn name(&self) -> &'static str {
        "modify-servers-openapi"
    }

    fn order(&self) -> i32 {
        MODIFY_SERVERS_ORDER
    }

    async fn filter(&self, mut exchange: Exchange) -> Result<Exchange, FilterError> {
        if !self.should_intercept(&exchange.path) {
            return Ok(exchange);
        }

        let response = &mut exchange.response;
        if !response.parts.status.is_success() || response.parts.status == StatusCode::NO_CONTENT {
            tracing::debug!(path = %exchange.path, status = %response.parts.status, "Not rewriting API docs response without a document");
            return Ok(exchange);
        }
        if !gzip::is_rewritable_encoding(&response.parts.headers) {
            tracing::debug!(
                path = %exchange.path,
                encoding = ?response.parts.headers.get(header::CONTENT_ENCODING),
                "Not rewriting API docs response in unsupported encoding"
            );
            metrics::record_openapi_rewrite("skipped");
            return Ok(exchange);
        }

        let mut interceptor = self.create_interceptor(&exchange.path, &response.parts.headers);
        let body = std::mem::replace(&mut response.body, BodySource::Singleton(Default::default()));

        let bytes = match interceptor.write_with(body).await {
            Ok(bytes) => bytes,
            Err(e) => {
                metrics::record_openapi_rewrite("error");
                return Err(e);
            }
        };

        match interceptor.state() {
            InterceptorState::RewriteSucceeded => {
                response.parts.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                tracing::debug!(
                    path = %exchange.path,
                    service_prefix = %interceptor.context().service_path_prefix,
                    gzip = interceptor.is_gzipped(),
                    "Rewrote OpenAPI servers"
                );
                metrics::record_openapi_rewrite("rewritten");
            }
            InterceptorState::RewriteFailed => metrics::record_openapi_rewrite("decompression_failed"),
            _ => metrics::record_openapi_rewrite("skipped"),
        }

        response.body = BodySource::Singleton(bytes);
        Ok(exchange)
    }
}
