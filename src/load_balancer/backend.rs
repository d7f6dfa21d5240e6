//! Service instance abstraction.
//!
//! # Responsibilities
//! - Represent a single downstream service instance
//! - Track active connections
//! - Enforce max connection limits

use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A single service instance.
#[derive(Debug)]
pub struct Backend {
    /// Configured backend name.
    pub name: String,
    /// The address of the backend.
    pub addr: SocketAddr,
    /// Maximum concurrent connections allowed.
    pub max_connections: usize,
    /// Number of currently active connections.
    pub active_connections: AtomicUsize,
}

impl Backend {
    /// Create a new backend.
    pub fn new(name: impl Into<String>, addr: SocketAddr, max_connections: usize) -> Self {
        Self {
            name: name.into(),
            addr,
            max_connections,
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Get the current number of active connections.
    pub fn connection_count(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Whether another connection fits under the limit.
    pub fn has_capacity(&self) -> bool {
        self.connection_count() < self.max_connections
    }

    /// Try to create a connection guard that increments count.
    pub fn try_create_guard(self: &Arc<Self>) -> Option<BackendConnectionGuard> {
        let mut prev = self.active_connections.load(Ordering::Relaxed);
        loop {
            if prev >= self.max_connections {
                return None;
            }
            match self.active_connections.compare_exchange_weak(
                prev,
                prev + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(x) => prev = x,
            }
        }
        Some(BackendConnectionGuard {
            backend: self.clone(),
        })
    }
}

/// A RAII guard that manages the active connection count.
#[derive(Debug)]
pub struct BackendConnectionGuard {
    pub backend: Arc<Backend>,
}

impl Deref for BackendConnectionGuard {
    type Target = Backend;
    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

impl Drop for BackendConnectionGuard {
    fn drop(&mut self) {
        self.backend.active_connections.fetch_sub(1, Ordering::Relaxed);
    }
}
