//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions mapping requests to service instances.
    pub routes: Vec<RouteConfig>,

    /// Service instance definitions.
    pub backends: Vec<BackendConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// OpenAPI document rewriting.
    pub openapi: OpenApiConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Route configuration mapping requests to backend groups.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Host header to match (exact match).
    pub host: Option<String>,

    /// Path prefix to match, e.g. "/services/store/store-1".
    pub path_prefix: Option<String>,

    /// Backend group name to forward to.
    pub backend_group: String,

    /// Route priority (higher = checked first).
    #[serde(default)]
    pub priority: u32,

    /// Remove `path_prefix` from the path before forwarding.
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: bool,
}

fn default_strip_prefix() -> bool {
    true
}

/// Service instance configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Unique backend identifier.
    pub name: String,

    /// Backend group this instance belongs to.
    pub group: String,

    /// Backend address (e.g., "127.0.0.1:3000").
    pub address: String,

    /// Maximum concurrent connections to this backend.
    #[serde(default = "default_max_backend_conns")]
    pub max_connections: usize,
}

fn default_max_backend_conns() -> usize {
    100
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Settings for the `servers` rewrite of downstream OpenAPI documents.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenApiConfig {
    /// Register the rewriting filter.
    pub enabled: bool,

    /// First path segment of service routes, without slashes.
    pub routing_prefix: String,

    /// Path suffix under which services publish their document.
    pub docs_suffix: String,

    /// `description` of the injected server entry.
    pub server_description: String,

    /// Largest document (as received, possibly compressed) that is buffered.
    pub max_document_bytes: usize,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            routing_prefix: "services".to_string(),
            docs_suffix: "/v3/api-docs".to_string(),
            server_description: "added by global filter".to_string(),
            max_document_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
