//! HTTP server setup and request forwarding.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch requests to the routing table
//! - Forward requests to the selected service instance
//! - Run downstream responses through the filter chain
//! - Swap routing state when a new configuration arrives

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, uri::Scheme, Request, StatusCode, Uri, Version},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::filter::{Exchange, FilterChain, GatewayResponse};
use crate::http::request::{self, MakeRequestUuidV4, X_REQUEST_ID};
use crate::load_balancer::BackendManager;
use crate::observability::metrics;
use crate::routing::Router as ProxyRouter;

/// Everything derived from one configuration generation.
#[derive(Debug)]
pub struct GatewayState {
    pub router: ProxyRouter,
    pub backends: BackendManager,
    pub filters: FilterChain,
}

impl GatewayState {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            router: ProxyRouter::from_config(config.routes.clone()),
            backends: BackendManager::new(config.backends.clone()),
            filters: FilterChain::from_config(&config.openapi),
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<GatewayState>>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            inner: Arc::new(ArcSwap::from_pointee(GatewayState::from_config(&config))),
            client,
        };

        tracing::debug!(filters = ?state.inner.load().filters, "Response filters registered");

        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %request::request_id(req.headers()),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    /// The fully layered router, for serving or in-process calls.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Replace routes, backends and filters with those of `config`.
    pub fn apply_config(&self, config: &GatewayConfig) {
        swap_state(&self.state, config);
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` replace the routing state
    /// of the running server; listener and timeout settings need a restart.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                swap_state(&state, &config);
            }
        });

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

fn swap_state(state: &AppState, config: &GatewayConfig) {
    let next = GatewayState::from_config(config);
    tracing::info!(
        routes = next.router.len(),
        backends = next.backends.all_backends().len(),
        "Configuration applied"
    );
    state.inner.store(Arc::new(next));
}

/// Main proxy handler.
/// Looks up route, selects backend, forwards request and filters the response.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let gateway = state.inner.load_full();

    let request_id = request::request_id(request.headers()).to_string();
    let path = request.uri().path().to_string();
    let method = request.method().to_string();

    tracing::debug!(request_id = %request_id, method = %method, path = %path, "Proxying request");

    // 1. Match Route
    let Some(route) = gateway.router.match_request(&request) else {
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_request(&method, 404, "none", start_time);
        return (StatusCode::NOT_FOUND, "No matching route found").into_response();
    };

    // 2. Select Backend
    let Some(backend) = gateway.backends.get(&route.backend_group) else {
        tracing::warn!(request_id = %request_id, group = %route.backend_group, "No available backend");
        metrics::record_request(&method, 503, "none", start_time);
        return (StatusCode::SERVICE_UNAVAILABLE, "No available backend").into_response();
    };
    let backend_addr = backend.addr.to_string();

    // 3. Rewrite URI
    let (mut parts, body) = request.into_parts();
    let upstream_path = route.upstream_path(&path);
    let path_and_query = match parts.uri.query() {
        Some(query) => format!("{}?{}", upstream_path, query),
        None => upstream_path.to_string(),
    };
    let uri = match Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(backend_addr.as_str())
        .path_and_query(path_and_query)
        .build()
    {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Cannot build upstream URI");
            metrics::record_request(&method, 400, &backend_addr, start_time);
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };
    parts.uri = uri;
    parts.version = Version::HTTP_11;
    parts.headers.remove(header::HOST);

    // 4. Forward
    let upstream = match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => response.map(Body::new),
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend_addr, error = %e, "Upstream error");
            metrics::record_request(&method, 502, &backend_addr, start_time);
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    // 5. Filter Response
    let exchange = Exchange::new(path, GatewayResponse::streaming(upstream));
    let response = match gateway.filters.apply(exchange).await {
        Ok(exchange) => exchange.response.into_response(),
        Err(e) => e.into_response(),
    };

    metrics::record_request(&method, response.status().as_u16(), &backend_addr, start_time);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, RouteConfig};
    use tower::ServiceExt;

    fn config_with_route() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.backends.push(BackendConfig {
            name: "unreachable".into(),
            group: "store-1".into(),
            // Reserved port, nothing listens there.
            address: "127.0.0.1:1".into(),
            max_connections: 10,
        });
        config.routes.push(RouteConfig {
            name: "store".into(),
            host: None,
            path_prefix: Some("/services/store/store-1".into()),
            backend_group: "store-1".into(),
            priority: 0,
            strip_prefix: true,
        });
        config
    }

    #[tokio::test]
    async fn unmatched_route_is_404_with_request_id() {
        let server = HttpServer::new(GatewayConfig::default());

        let response = server
            .router()
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn client_request_id_is_propagated() {
        let server = HttpServer::new(GatewayConfig::default());

        let response = server
            .router()
            .oneshot(
                Request::get("/nowhere")
                    .header(X_REQUEST_ID, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[X_REQUEST_ID], "req-42");
    }

    #[tokio::test]
    async fn unreachable_backend_is_502() {
        let server = HttpServer::new(config_with_route());

        let response = server
            .router()
            .oneshot(
                Request::get("/services/store/store-1/v3/api-docs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn applied_config_replaces_routes() {
        let server = HttpServer::new(config_with_route());
        server.apply_config(&GatewayConfig::default());

        let response = server
            .router()
            .oneshot(
                Request::get("/services/store/store-1/v3/api-docs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
