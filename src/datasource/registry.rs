//! Routing data source.
//!
//! # Responsibilities
//! - Own one handle per configured endpoint, keyed by name
//! - Ask the router for a target per unit of work and look the handle up
//! - Provide connection permits for the built-in handle type

use std::collections::HashMap;
use std::sync::Arc;
use serde::Serialize;
use crate::config::DataSourceConfig;
use crate::datasource::handle::{
    ConnectionPermit, DataSourceDescriptor, DataSourceFactory, DataSourceHandle,
};
use crate::datasource::UnitOfWork;
use crate::observability::metrics;
use crate::routing::{ConnectionRouter, DataSourceRole, ReplicationRouter, RoutingError};

/// A registered endpoint.
#[derive(Debug)]
pub struct Target<H> {
    pub name: String,
    pub role: DataSourceRole,
    pub handle: H,
}

/// Row of the routing table, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    pub name: String,
    pub role: DataSourceRole,
    pub in_rotation: bool,
}

/// Name → handle map fronted by a router.
#[derive(Debug)]
pub struct RoutingDataSource<H, R = ReplicationRouter> {
    targets: Vec<Target<H>>,
    index: HashMap<String, usize>,
    default_target: String,
    router: R,
}

impl<H, R: ConnectionRouter> RoutingDataSource<H, R> {
    /// Assemble from pre-built targets. `default_target` must be among them.
    pub fn new(targets: Vec<Target<H>>, default_target: impl Into<String>, router: R) -> Result<Self, RoutingError> {
        let default_target = default_target.into();
        let mut index = HashMap::with_capacity(targets.len());
        for (i, target) in targets.iter().enumerate() {
            if index.insert(target.name.clone(), i).is_some() {
                return Err(RoutingError::InvalidConfiguration(format!(
                    "duplicate data source name {}",
                    target.name
                )));
            }
        }
        if !index.contains_key(&default_target) {
            return Err(RoutingError::UnknownDataSource(default_target));
        }
        Ok(Self {
            targets,
            index,
            default_target,
            router,
        })
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Name of the fallback target (the primary).
    pub fn default_target(&self) -> &str {
        &self.default_target
    }

    /// Registered names, primary first, then configured order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&H> {
        self.index.get(name).map(|&i| &self.targets[i].handle)
    }

    pub fn role_of(&self, name: &str) -> Option<DataSourceRole> {
        self.index.get(name).map(|&i| self.targets[i].role)
    }

    /// Pick the target name for `unit`. Advances the rotation for reads.
    pub fn determine_target(&self, unit: &UnitOfWork) -> &str {
        self.router.resolve_for(unit)
    }

    /// Pick the target for `unit` and return its handle.
    pub fn resolve(&self, unit: &UnitOfWork) -> Result<(&str, &H), RoutingError> {
        let target = self.determine_target(unit);
        let handle = self
            .get(target)
            .ok_or_else(|| RoutingError::UnknownDataSource(target.to_string()))?;

        metrics::record_route(target, unit.is_read_only());
        tracing::debug!(
            unit_of_work = %unit.id(),
            unit_name = unit.name().unwrap_or(""),
            read_only = unit.is_read_only(),
            datasource = target,
            "Routed unit of work"
        );
        Ok((target, handle))
    }
}

impl<H> RoutingDataSource<H, ReplicationRouter> {
    /// Build every handle through `factory` and wire the replica rotation.
    ///
    /// Fails with `InvalidConfiguration` when read routing is on and no
    /// endpoint classifies as a replica.
    pub fn from_config<F>(config: &DataSourceConfig, factory: &F) -> Result<Self, RoutingError>
    where
        F: DataSourceFactory<Handle = H>,
    {
        let descriptors = DataSourceDescriptor::from_config(config)?;

        let replicas: Vec<String> = descriptors
            .iter()
            .filter(|d| d.role == DataSourceRole::Replica)
            .map(|d| d.name.clone())
            .collect();

        let router = if config.read_routing {
            ReplicationRouter::new(config.primary_name.clone(), replicas)?
        } else {
            tracing::info!(primary = %config.primary_name, "Read routing disabled; all units go to the primary");
            ReplicationRouter::primary_only(config.primary_name.clone())
        };

        let mut targets = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            let handle = factory.create(descriptor)?;
            tracing::info!(
                datasource = %descriptor.name,
                role = %descriptor.role,
                url = %descriptor.url,
                max_connections = descriptor.max_connections,
                "Registered data source"
            );
            targets.push(Target {
                name: descriptor.name.clone(),
                role: descriptor.role,
                handle,
            });
        }

        Self::new(targets, config.primary_name.clone(), router)
    }

    /// Routing table rows in registration order.
    pub fn summary(&self) -> Vec<TargetSummary> {
        let rotation = self.router.replicas();
        self.targets
            .iter()
            .map(|t| TargetSummary {
                name: t.name.clone(),
                role: t.role,
                in_rotation: rotation.contains(&t.name.as_str()),
            })
            .collect()
    }
}

impl<R: ConnectionRouter> RoutingDataSource<Arc<DataSourceHandle>, R> {
    /// Route `unit` and take a connection slot on the chosen handle.
    pub fn acquire(&self, unit: &UnitOfWork) -> Result<ConnectionPermit, RoutingError> {
        let (target, handle) = self.resolve(unit)?;
        match handle.try_acquire() {
            Some(permit) => Ok(permit),
            None => {
                metrics::record_pool_exhausted(target);
                tracing::warn!(
                    unit_of_work = %unit.id(),
                    datasource = target,
                    max_connections = handle.descriptor().max_connections,
                    "Data source exhausted"
                );
                Err(RoutingError::PoolExhausted {
                    name: target.to_string(),
                    max_connections: handle.descriptor().max_connections,
                })
            }
        }
    }
}
