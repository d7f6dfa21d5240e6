//! Backend pool management.
//!
//! # Responsibilities
//! - Manage collections of service instances grouped by name
//! - Apply load balancing algorithms to select an instance
//! - Provide connection guards for tracking

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::BackendConfig;
use crate::load_balancer::{
    backend::{Backend, BackendConnectionGuard},
    round_robin::RoundRobin,
    LoadBalancer,
};

struct BackendGroup {
    backends: Vec<Arc<Backend>>,
    balancer: Box<dyn LoadBalancer>,
}

impl std::fmt::Debug for BackendGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendGroup")
            .field("backends", &self.backends)
            .finish_non_exhaustive()
    }
}

/// Manages backend pools and load balancing.
#[derive(Debug, Default)]
pub struct BackendManager {
    groups: HashMap<String, BackendGroup>,
}

impl BackendManager {
    /// Create a new backend manager from configuration.
    pub fn new(configs: Vec<BackendConfig>) -> Self {
        let mut grouped: HashMap<String, Vec<Arc<Backend>>> = HashMap::new();

        for config in configs {
            match config.address.parse() {
                Ok(addr) => {
                    let backend = Arc::new(Backend::new(config.name, addr, config.max_connections));
                    grouped.entry(config.group).or_default().push(backend);
                }
                Err(_) => {
                    tracing::warn!(backend = %config.name, address = %config.address, "Invalid backend address");
                }
            }
        }

        let groups = grouped
            .into_iter()
            .map(|(name, backends)| {
                let group = BackendGroup {
                    backends,
                    balancer: Box::new(RoundRobin::new()),
                };
                (name, group)
            })
            .collect();

        Self { groups }
    }

    /// Select a backend for the given group.
    /// Returns a guard that decrements the connection count on drop.
    pub fn get(&self, group_name: &str) -> Option<BackendConnectionGuard> {
        let Some(group) = self.groups.get(group_name) else {
            tracing::debug!(group = %group_name, "Group not found in BackendManager");
            return None;
        };

        match group.balancer.next_server(&group.backends) {
            Some(backend) => backend.try_create_guard(),
            None => {
                tracing::debug!(
                    group = %group_name,
                    backend_count = group.backends.len(),
                    "No backend with free capacity in group"
                );
                None
            }
        }
    }

    /// Return a list of all backends.
    pub fn all_backends(&self) -> Vec<Arc<Backend>> {
        self.groups
            .values()
            .flat_map(|g| g.backends.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, group: &str, address: &str) -> BackendConfig {
        BackendConfig {
            name: name.into(),
            group: group.into(),
            address: address.into(),
            max_connections: 1,
        }
    }

    #[test]
    fn groups_backends_and_skips_invalid_addresses() {
        let manager = BackendManager::new(vec![
            config("a1", "a", "127.0.0.1:9001"),
            config("a2", "a", "127.0.0.1:9002"),
            config("bad", "a", "nowhere"),
            config("b1", "b", "127.0.0.1:9003"),
        ]);

        assert_eq!(manager.all_backends().len(), 3);
        assert!(manager.get("a").is_some());
        assert!(manager.get("missing").is_none());
    }

    #[test]
    fn exhausted_group_returns_none() {
        let manager = BackendManager::new(vec![config("b1", "b", "127.0.0.1:9003")]);

        let guard = manager.get("b").unwrap();
        assert_eq!(guard.name, "b1");
        assert!(manager.get("b").is_none());

        drop(guard);
        assert!(manager.get("b").is_some());
    }
}
