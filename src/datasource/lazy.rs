//! Deferred target resolution.
//!
//! A transaction manager usually opens its connection before it knows
//! whether the unit of work is read-only. `LazyConnection` holds off on
//! routing until the first real use, so the flag is final by then.

use crate::datasource::{RoutingDataSource, UnitOfWork};
use crate::routing::{ConnectionRouter, RoutingError};

/// A connection whose target is chosen on first use.
#[derive(Debug)]
pub struct LazyConnection<'a, H, R> {
    source: &'a RoutingDataSource<H, R>,
    unit: UnitOfWork,
    target: Option<&'a str>,
}

impl<'a, H, R: ConnectionRouter> LazyConnection<'a, H, R> {
    pub fn new(source: &'a RoutingDataSource<H, R>, unit: UnitOfWork) -> Self {
        Self {
            source,
            unit,
            target: None,
        }
    }

    pub fn unit(&self) -> &UnitOfWork {
        &self.unit
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }

    /// Change the read-only intent. Fails once a target was chosen.
    pub fn set_read_only(&mut self, read_only: bool) -> Result<(), RoutingError> {
        if let Some(target) = self.target {
            return Err(RoutingError::AlreadyResolved(target.to_string()));
        }
        self.unit.set_read_only(read_only);
        Ok(())
    }

    /// Resolve on first call; later calls return the same target.
    pub fn target(&mut self) -> Result<&'a str, RoutingError> {
        if let Some(target) = self.target {
            return Ok(target);
        }
        let (target, _) = self.source.resolve(&self.unit)?;
        self.target = Some(target);
        Ok(target)
    }

    /// Handle for the resolved target, resolving first if needed.
    pub fn handle(&mut self) -> Result<&'a H, RoutingError> {
        let target = self.target()?;
        self.source
            .get(target)
            .ok_or_else(|| RoutingError::UnknownDataSource(target.to_string()))
    }
}

impl<H, R: ConnectionRouter> RoutingDataSource<H, R> {
    /// Open a lazily routed connection for `unit`.
    pub fn lazy(&self, unit: UnitOfWork) -> LazyConnection<'_, H, R> {
        LazyConnection::new(self, unit)
    }
}
