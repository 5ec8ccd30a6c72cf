//! Primary/replica data-source routing library

pub mod config;
pub mod datasource;
pub mod observability;
pub mod routing;
pub mod simulation;

pub use config::schema::AppConfig;
pub use datasource::{RoutingDataSource, UnitOfWork};
pub use routing::{CircularSelector, ConnectionRouter, ReplicationRouter, RoutingError};
