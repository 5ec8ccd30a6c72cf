//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use crate::routing::DataSourceRole;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Primary and replica endpoints.
    pub datasource: DataSourceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Primary endpoint plus the ordered replica list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataSourceConfig {
    /// Primary connection URL (e.g., "mysql://10.0.0.1:3306/shop").
    pub url: String,

    /// Username shared by every endpoint unless overridden.
    pub username: String,

    /// Password shared by every endpoint unless overridden.
    #[serde(skip_serializing)]
    pub password: String,

    /// Name the primary is registered under.
    pub primary_name: String,

    /// Substring that marks an untagged replica entry as a replica.
    pub replica_marker: String,

    /// Route read-only units of work to replicas.
    pub read_routing: bool,

    /// Default per-endpoint connection limit.
    pub max_connections: usize,

    /// Replica endpoints, in rotation order.
    pub replicas: Vec<ReplicaConfig>,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            url: "mysql://localhost:3306/app".to_string(),
            username: "root".to_string(),
            password: String::new(),
            primary_name: "master".to_string(),
            replica_marker: "slave".to_string(),
            read_routing: true,
            max_connections: 10,
            replicas: Vec::new(),
        }
    }
}

/// A single replica endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplicaConfig {
    /// Unique name; doubles as the routing target.
    pub name: String,

    /// Connection URL.
    pub url: String,

    /// Explicit role. Inferred from `replica_marker` when absent.
    #[serde(default)]
    pub role: Option<DataSourceRole>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default)]
    pub max_connections: Option<usize>,
}

impl ReplicaConfig {
    /// Replica entry with inherited credentials and limits.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            role: None,
            username: None,
            password: None,
            max_connections: None,
        }
    }

    pub fn with_role(mut self, role: DataSourceRole) -> Self {
        self.role = Some(role);
        self
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
