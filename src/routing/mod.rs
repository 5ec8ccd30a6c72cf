//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Unit of work (read_only flag)
//!     → router.rs (primary or replica?)
//!         - read-write → primary name
//!         - read-only  → circular.rs (next replica name)
//!     → Return: data-source name
//!
//! Router construction (at startup):
//!     DataSourceConfig
//!     → role.rs (tag each endpoint)
//!     → Replica names in configured order
//!     → Freeze as immutable ReplicationRouter
//! ```
//!
//! # Design Decisions
//! - Resolution is synchronous, lock-free and never blocks
//! - Only names are returned; connections belong to the datasource layer
//! - Replica order is the configured order, not sorted

pub mod circular;
pub mod error;
pub mod role;
pub mod router;

pub use circular::CircularSelector;
pub use error::RoutingError;
pub use role::{DataSourceRole, RoleClassifier};
pub use router::{ConnectionRouter, ReplicationRouter};
