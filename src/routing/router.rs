//! Target lookup for a unit of work.
//!
//! # Responsibilities
//! - Map a read-only flag to a data-source name
//! - Send writes to the primary, reads around the replica rotation
//!
//! # Design Decisions
//! - Immutable after construction except for the rotation cursor
//! - The read-only flag is passed in, never looked up from ambient state
//! - An empty replica set is a construction error, not a runtime fallback

use crate::datasource::UnitOfWork;
use crate::routing::circular::CircularSelector;
use crate::routing::error::RoutingError;

/// Decides which data source serves a unit of work.
pub trait ConnectionRouter: Send + Sync + std::fmt::Debug {
    /// Name of the data source for a unit of work with the given intent.
    fn resolve(&self, read_only: bool) -> &str;

    /// Name of the data source for `unit`.
    fn resolve_for(&self, unit: &UnitOfWork) -> &str {
        self.resolve(unit.is_read_only())
    }
}

/// Primary/replica router with round-robin reads.
#[derive(Debug)]
pub struct ReplicationRouter {
    primary: String,
    replicas: Option<CircularSelector<String>>,
}

impl ReplicationRouter {
    /// Create a router that spreads read-only work over `replicas` in order.
    pub fn new(primary: impl Into<String>, replicas: Vec<String>) -> Result<Self, RoutingError> {
        let primary = primary.into();
        if replicas.is_empty() {
            return Err(RoutingError::InvalidConfiguration(format!(
                "read routing is enabled but no replicas are registered for primary {}",
                primary
            )));
        }
        Ok(Self {
            primary,
            replicas: Some(CircularSelector::new(replicas)?),
        })
    }

    /// Create a router with read routing switched off; every unit goes to the primary.
    pub fn primary_only(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            replicas: None,
        }
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Replica names in rotation order (empty when read routing is off).
    pub fn replicas(&self) -> Vec<&str> {
        self.replicas
            .as_ref()
            .map(|r| r.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn read_routing_enabled(&self) -> bool {
        self.replicas.is_some()
    }
}

impl ConnectionRouter for ReplicationRouter {
    fn resolve(&self, read_only: bool) -> &str {
        match (&self.replicas, read_only) {
            (Some(replicas), true) => replicas.next(),
            _ => &self.primary,
        }
    }
}
