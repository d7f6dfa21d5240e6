//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing backend groups)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("route '{route}' references unknown backend group '{group}'")]
    UnknownBackendGroup { route: String, group: String },

    #[error("route '{route}' path prefix '{prefix}' must start with '/'")]
    PathPrefix { route: String, prefix: String },

    #[error("backend '{backend}' has invalid address '{address}'")]
    BackendAddress { backend: String, address: String },

    #[error("timeout '{0}' must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("openapi.max_document_bytes must be greater than zero")]
    ZeroDocumentLimit,

    #[error("openapi.routing_prefix must be a single non-empty path segment")]
    RoutingPrefix,

    #[error("openapi.docs_suffix must start with '/'")]
    DocsSuffix,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let groups: HashSet<&str> = config.backends.iter().map(|b| b.group.as_str()).collect();

    for route in &config.routes {
        if !groups.contains(route.backend_group.as_str()) {
            errors.push(ValidationError::UnknownBackendGroup {
                route: route.name.clone(),
                group: route.backend_group.clone(),
            });
        }
        if let Some(prefix) = &route.path_prefix {
            if !prefix.starts_with('/') {
                errors.push(ValidationError::PathPrefix {
                    route: route.name.clone(),
                    prefix: prefix.clone(),
                });
            }
        }
    }

    for backend in &config.backends {
        if backend.address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::BackendAddress {
                backend: backend.name.clone(),
                address: backend.address.clone(),
            });
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    let openapi = &config.openapi;
    if openapi.max_document_bytes == 0 {
        errors.push(ValidationError::ZeroDocumentLimit);
    }
    if openapi.routing_prefix.is_empty() || openapi.routing_prefix.contains('/') {
        errors.push(ValidationError::RoutingPrefix);
    }
    if !openapi.docs_suffix.starts_with('/') {
        errors.push(ValidationError::DocsSuffix);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
