//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → RoutingDataSource::from_config at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once; replica membership changes need a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AppConfig;
pub use schema::DataSourceConfig;
pub use schema::ObservabilityConfig;
pub use schema::ReplicaConfig;
pub use validation::ValidationError;
