//! Shared fixtures for integration tests.

use std::path::PathBuf;
use std::sync::Arc;
use replica_router::config::{AppConfig, DataSourceConfig, ReplicaConfig};
use replica_router::datasource::{DataSourceHandle, RoutingDataSource, SimpleDataSourceFactory};

/// Data-source config with `n` marker-named replicas: slave1..slaveN.
pub fn replica_config(n: usize) -> DataSourceConfig {
    let mut config = DataSourceConfig::default();
    config.max_connections = 1_000;
    config.replicas = (1..=n)
        .map(|i| ReplicaConfig::new(format!("slave{}", i), format!("mysql://10.0.1.{}:3306/app", i)))
        .collect();
    config
}

/// Routing data source over `n` replicas.
#[allow(dead_code)]
pub fn routing_source(n: usize) -> Arc<RoutingDataSource<Arc<DataSourceHandle>>> {
    Arc::new(RoutingDataSource::from_config(&replica_config(n), &SimpleDataSourceFactory).unwrap())
}

/// Write `content` to a unique file under the system temp dir.
#[allow(dead_code)]
pub fn write_temp_config(content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("replica-router-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, content).unwrap();
    path
}

#[allow(dead_code)]
pub fn app_config(n: usize) -> AppConfig {
    AppConfig {
        datasource: replica_config(n),
        ..AppConfig::default()
    }
}
