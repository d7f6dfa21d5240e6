//! Ordered execution of global response filters.

use std::sync::Arc;

use crate::config::OpenApiConfig;
use crate::filter::{
    Exchange, FilterError, GlobalFilter, HopByHopHeadersFilter, ModifyServersOpenApiFilter,
};

/// Global filters sorted by ascending order value.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn GlobalFilter>>,
}

impl FilterChain {
    pub fn new(mut filters: Vec<Arc<dyn GlobalFilter>>) -> Self {
        // Stable: registration order breaks ties.
        filters.sort_by_key(|f| f.order());
        Self { filters }
    }

    /// The gateway's default chain.
    pub fn from_config(openapi: &OpenApiConfig) -> Self {
        let mut filters: Vec<Arc<dyn GlobalFilter>> = vec![Arc::new(HopByHopHeadersFilter)];
        if openapi.enabled {
            filters.push(Arc::new(ModifyServersOpenApiFilter::new(openapi.clone())));
        }
        Self::new(filters)
    }

    /// Filter names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Run every filter in turn, stopping at the first failure.
    pub async fn apply(&self, mut exchange: Exchange) -> Result<Exchange, FilterError> {
        let path = exchange.path.clone();
        for filter in &self.filters {
            exchange = match filter.filter(exchange).await {
                Ok(next) => next,
                Err(e) => {
                    tracing::error!(filter = filter.name(), path = %path, error = %e, "Response filter failed");
                    return Err(e);
                }
            };
        }
        Ok(exchange)
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::GatewayResponse;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{HeaderValue, Response};

    /// Appends its name to the `x-trace` response header.
    struct Tag(&'static str, i32);

    #[async_trait]
    impl GlobalFilter for Tag {
        fn name(&self) -> &'static str {
            self.0
        }

        fn order(&self) -> i32 {
            self.1
        }

        async fn filter(&self, mut exchange: Exchange) -> Result<Exchange, FilterError> {
            let headers = &mut exchange.response.parts.headers;
            let trail = headers
                .get("x-trace")
                .and_then(|v| v.to_str().ok())
                .map(|v| format!("{},{}", v, self.0))
                .unwrap_or_else(|| self.0.to_string());
            headers.insert("x-trace", HeaderValue::from_str(&trail).unwrap());
            Ok(exchange)
        }
    }

    struct Fail;

    #[async_trait]
    impl GlobalFilter for Fail {
        fn name(&self) -> &'static str {
            "fail"
        }

        fn order(&self) -> i32 {
            5
        }

        async fn filter(&self, _exchange: Exchange) -> Result<Exchange, FilterError> {
            Err(FilterError::NotAnObject)
        }
    }

    fn exchange() -> Exchange {
        Exchange::new("/x", GatewayResponse::streaming(Response::new(Body::empty())))
    }

    #[tokio::test]
    async fn runs_filters_in_ascending_order() {
        let filters: Vec<Arc<dyn GlobalFilter>> = vec![
            Arc::new(Tag("metrics", 10)),
            Arc::new(Tag("rewrite", -1)),
            Arc::new(Tag("cors", 0)),
            Arc::new(Tag("auth", -1)),
        ];
        let chain = FilterChain::new(filters);

        assert_eq!(chain.names(), vec!["rewrite", "auth", "cors", "metrics"]);

        let out = chain.apply(exchange()).await.unwrap();
        assert_eq!(out.response.parts.headers["x-trace"], "rewrite,auth,cors,metrics");
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let filters: Vec<Arc<dyn GlobalFilter>> = vec![Arc::new(Fail), Arc::new(Tag("late", 10))];
        let chain = FilterChain::new(filters);
        assert!(chain.apply(exchange()).await.is_err());
    }

    #[test]
    fn default_chain_puts_rewrite_first() {
        let chain = FilterChain::from_config(&OpenApiConfig::default());
        assert_eq!(chain.names(), vec!["modify-servers-openapi", "hop-by-hop-headers"]);

        let disabled = OpenApiConfig {
            enabled: false,
            ..OpenApiConfig::default()
        };
        assert_eq!(FilterChain::from_config(&disabled).names(), vec!["hop-by-hop-headers"]);
    }
}
