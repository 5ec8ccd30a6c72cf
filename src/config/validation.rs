//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check endpoint URLs and name uniqueness
//! - Check that read routing has at least one replica to route to
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;
use crate::config::schema::AppConfig;
use crate::routing::{DataSourceRole, RoleClassifier};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("datasource {name}: invalid url {url:?}")]
    InvalidUrl { name: String, url: String },

    #[error("primary_name must not be empty")]
    EmptyPrimaryName,

    #[error("replica #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("duplicate data source name {0}")]
    DuplicateName(String),

    #[error("replica {0} may not declare role primary")]
    SecondPrimary(String),

    #[error("datasource {0}: max_connections must be greater than zero")]
    ZeroConnections(String),

    #[error("read routing is enabled but no replica is configured (marker {marker:?})")]
    NoReplicas { marker: String },

    #[error("invalid metrics address {0:?}")]
    InvalidMetricsAddress(String),
}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let ds = &config.datasource;

    if ds.primary_name.is_empty() {
        errors.push(ValidationError::EmptyPrimaryName);
    }
    if Url::parse(&ds.url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            name: ds.primary_name.clone(),
            url: ds.url.clone(),
        });
    }
    if ds.max_connections == 0 {
        errors.push(ValidationError::ZeroConnections(ds.primary_name.clone()));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(ds.primary_name.as_str());

    let classifier = RoleClassifier::new(ds.replica_marker.clone());
    let mut replica_count = 0;

    for (index, replica) in ds.replicas.iter().enumerate() {
        if replica.name.is_empty() {
            errors.push(ValidationError::EmptyName { index });
            continue;
        }
        if !seen.insert(replica.name.as_str()) {
            errors.push(ValidationError::DuplicateName(replica.name.clone()));
        }
        if Url::parse(&replica.url).is_err() {
            errors.push(ValidationError::InvalidUrl {
                name: replica.name.clone(),
                url: replica.url.clone(),
            });
        }
        if replica.max_connections == Some(0) {
            errors.push(ValidationError::ZeroConnections(replica.name.clone()));
        }
        match classifier.classify(&replica.name, replica.role) {
            DataSourceRole::Primary => {
                errors.push(ValidationError::SecondPrimary(replica.name.clone()));
            }
            DataSourceRole::Replica => replica_count += 1,
            DataSourceRole::Standby => {}
        }
    }

    if ds.read_routing && replica_count == 0 {
        errors.push(ValidationError::NoReplicas {
            marker: ds.replica_marker.clone(),
        });
    }

    let metrics = &config.observability;
    if metrics.metrics_enabled && metrics.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(metrics.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
