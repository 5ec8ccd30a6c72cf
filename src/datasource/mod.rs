//! Data-source subsystem.
//!
//! # Data Flow
//! ```text
//! DataSourceConfig (at startup)
//!     → handle.rs (descriptors, one handle per endpoint via factory)
//!     → registry.rs (name → handle map + ReplicationRouter)
//!
//! Unit of work begins:
//!     → unit_of_work.rs (read_only flag, id)
//!     → lazy.rs (optional: defer routing until first use)
//!     → registry.rs (router picks name, handle looked up)
//!     → handle.rs (take connection permit)
//!     → Return permit or error
//! ```
//!
//! # Design Decisions
//! - Composition over a framework base class: the router is a field
//! - Primary is the default target and is always registered
//! - Standby endpoints are reachable by name only
//! - Connection accounting per handle; real pools plug in via the factory

pub mod handle;
pub mod lazy;
pub mod registry;
pub mod unit_of_work;

pub use handle::{
    ConnectionPermit, DataSourceDescriptor, DataSourceFactory, DataSourceHandle,
    SimpleDataSourceFactory,
};
pub use lazy::LazyConnection;
pub use registry::{RoutingDataSource, Target, TargetSummary};
pub use unit_of_work::UnitOfWork;
