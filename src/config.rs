//! Store configuration consumed by the connection registry.
//! Resolution (files, env, host wiring) happens outside this crate; the core
//! only reads the resolved values.

use serde::{Deserialize, Serialize};

/// Connection settings for one logical store.
///
/// `contact_points` is the comma-separated host list that also keys the
/// process-wide cluster cache. `keyspace` is the fallback used when a caller
/// acquires a session without an owner scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    pub contact_points: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub keyspace: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            contact_points: "127.0.0.1".to_string(),
            username: None,
            password: None,
            keyspace: None,
        }
    }
}

impl StoreConfig {
    /// Convenience constructor for hosts that only set contact points.
    pub fn with_contact_points<S: Into<String>>(contact_points: S) -> Self {
        Self { contact_points: contact_points.into(), ..Self::default() }
    }
}
