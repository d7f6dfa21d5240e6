//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up matching route for request
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in priority order (acceptable for typical route counts)
//! - Explicit NoMatch rather than silent default

use axum::body::Body;
use axum::http::Request;

use crate::config::RouteConfig;
use crate::routing::matcher::{AndMatcher, HostMatcher, Matcher, PathPrefixMatcher};

/// A compiled route.
#[derive(Debug)]
pub struct Route {
    /// Route identifier for logging/metrics.
    pub name: String,
    /// Backend group requests are forwarded to.
    pub backend_group: String,
    priority: u32,
    strip: Option<String>,
    matcher: AndMatcher,
}

impl Route {
    fn compile(config: RouteConfig) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        if let Some(host) = &config.host {
            matchers.push(Box::new(HostMatcher::new(host.clone())));
        }
        if let Some(prefix) = &config.path_prefix {
            matchers.push(Box::new(PathPrefixMatcher::new(prefix.clone())));
        }

        let strip = match (&config.path_prefix, config.strip_prefix) {
            (Some(prefix), true) => Some(prefix.trim_end_matches('/').to_string()),
            _ => None,
        };

        Self {
            name: config.name,
            backend_group: config.backend_group,
            priority: config.priority,
            strip,
            matcher: AndMatcher::new(matchers),
        }
    }

    /// Path to request from the backend for an inbound `path`.
    pub fn upstream_path<'a>(&self, path: &'a str) -> &'a str {
        let Some(prefix) = &self.strip else {
            return path;
        };
        match path.strip_prefix(prefix.as_str()) {
            Some("") => "/",
            Some(rest) => rest,
            None => path,
        }
    }
}

/// Ordered route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Compile the configured routes, highest priority first.
    pub fn from_config(configs: Vec<RouteConfig>) -> Self {
        let mut routes: Vec<Route> = configs.into_iter().map(Route::compile).collect();
        // Stable sort keeps config order among equal priorities.
        routes.sort_by(|a, b| b.priority.cmp(&a.priority));

        tracing::debug!(route_count = routes.len(), "Routes compiled");
        Self { routes }
    }

    /// First route matching the request, if any.
    pub fn match_request(&self, req: &Request<Body>) -> Option<&Route> {
        self.routes.iter().find(|r| r.matcher.matches(req))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
