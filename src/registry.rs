//! Connection registry: the process-wide cache of cluster handles.
//! One `Cluster` is created per distinct contact-point string (plus
//! credentials) and lives for the process; sessions are handed out per
//! operation. The registry is an explicit object the host constructs and
//! injects, not ambient global state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cluster::{Cluster, Session};
use crate::config::StoreConfig;
use crate::error::FsResult;

/// Keyspace used when a session is acquired without an owner scope and the
/// configuration names none.
pub const DEFAULT_KEYSPACE: &str = "tablefs";

#[derive(Default)]
pub struct ClusterRegistry {
    clusters: RwLock<HashMap<String, Arc<Cluster>>>,
}

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn cache_key(config: &StoreConfig) -> String {
        // Same hosts under different credentials must not share a handle.
        format!("{}@{}", config.contact_points, config.username.as_deref().unwrap_or("-"))
    }

    /// Look up or create the cluster handle for this configuration.
    /// Create-if-absent is atomic: concurrent first callers converge on one
    /// handle, and steady-state lookups take only the read lock.
    pub fn cluster_for(&self, config: &StoreConfig) -> FsResult<Arc<Cluster>> {
        let key = Self::cache_key(config);
        if let Some(c) = self.clusters.read().get(&key) {
            return Ok(c.clone());
        }
        let built = Cluster::new(&config.contact_points, config.username.as_deref())?;
        let mut w = self.clusters.write();
        Ok(w.entry(key).or_insert(built).clone())
    }

    /// Acquire a session bound to `owner_scope`'s keyspace, falling back to
    /// the configured (or default) keyspace when the scope is empty.
    /// Connectivity failures propagate; nothing is retried here.
    pub fn acquire_session(&self, config: &StoreConfig, owner_scope: &str) -> FsResult<Session> {
        let cluster = self.cluster_for(config)?;
        let keyspace = if owner_scope.is_empty() {
            config.keyspace.clone().unwrap_or_else(|| DEFAULT_KEYSPACE.to_string())
        } else {
            owner_scope.to_string()
        };
        cluster.connect(&keyspace)
    }

    pub fn len(&self) -> usize {
        self.clusters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FsError;

    #[test]
    fn one_handle_per_contact_point_string() {
        let reg = ClusterRegistry::new();
        let cfg = StoreConfig::with_contact_points("10.0.0.1,10.0.0.2");
        let a = reg.cluster_for(&cfg).unwrap();
        let b = reg.cluster_for(&cfg).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(reg.len(), 1);

        let other = StoreConfig::with_contact_points("10.0.0.3");
        let c = reg.cluster_for(&other).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn credentials_distinguish_handles() {
        let reg = ClusterRegistry::new();
        let plain = StoreConfig::with_contact_points("10.0.0.1");
        let authed = StoreConfig {
            username: Some("svc".to_string()),
            password: Some("secret".to_string()),
            ..plain.clone()
        };
        let a = reg.cluster_for(&plain).unwrap();
        let b = reg.cluster_for(&authed).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn session_keyspace_resolution() {
        let reg = ClusterRegistry::new();
        let mut cfg = StoreConfig::with_contact_points("127.0.0.1");

        let s = reg.acquire_session(&cfg, "acme_app1").unwrap();
        assert_eq!(s.keyspace(), "acme_app1");

        let s = reg.acquire_session(&cfg, "").unwrap();
        assert_eq!(s.keyspace(), DEFAULT_KEYSPACE);

        cfg.keyspace = Some("shared".to_string());
        let s = reg.acquire_session(&cfg, "").unwrap();
        assert_eq!(s.keyspace(), "shared");
    }

    #[test]
    fn unreachable_configuration_propagates() {
        let reg = ClusterRegistry::new();
        let cfg = StoreConfig { contact_points: String::new(), ..Default::default() };
        assert!(matches!(reg.acquire_session(&cfg, "x"), Err(FsError::Connectivity { .. })));
        assert!(reg.is_empty());
    }
}
