//! Routing error definitions.

use thiserror::Error;

/// Errors that can occur while building or using the routing layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The routing configuration cannot support the requested routing mode.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A target name was resolved that has no registered data source.
    #[error("Unknown data source: {0}")]
    UnknownDataSource(String),

    /// The handle for the resolved target has no free connection slots.
    #[error("Data source {name} exhausted ({max_connections} connections in use)")]
    PoolExhausted { name: String, max_connections: usize },

    /// The data-source factory refused to build a handle.
    #[error("Failed to create data source {name}: {reason}")]
    Factory { name: String, reason: String },

    /// The unit of work already has a target; its intent can no longer change.
    #[error("Unit of work already routed to {0}")]
    AlreadyResolved(String),
}
