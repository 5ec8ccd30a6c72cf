//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing and datasource layers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging with unit-of-work ids on every routing event
//! - Metrics are cheap (atomic increments); recording without an
//!   installed exporter is a no-op

pub mod logging;
pub mod metrics;
