//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, LoadBalancer};

/// Round-robin selector.
/// Stores an internal counter to rotate through backends.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        // Skip saturated instances; give up after one full rotation.
        let start_count = self.counter.fetch_add(1, Ordering::Relaxed);
        let len = backends.len();

        for i in 0..len {
            let backend = &backends[(start_count + i) % len];
            if backend.has_capacity() {
                return Some(backend.clone());
            }
        }
        None
    }
}
