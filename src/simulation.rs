//! Concurrent workload driver.
//!
//! Runs a batch of units of work across tokio tasks against a routing data
//! source and tallies where each one landed. Backs the `simulate` command.

use std::collections::BTreeMap;
use std::sync::Arc;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use crate::datasource::{DataSourceHandle, RoutingDataSource, UnitOfWork};
use crate::routing::{ConnectionRouter, RoutingError};

/// Errors that abort a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("read ratio must be between 0 and 1, got {0}")]
    InvalidReadRatio(f64),

    #[error("simulation worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Workload shape.
#[derive(Debug, Clone, Copy)]
pub struct SimulationParams {
    /// Total units of work.
    pub units: usize,
    /// Number of concurrent tasks.
    pub concurrency: usize,
    /// Probability (0.0 to 1.0) that a unit is read-only.
    pub read_ratio: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            units: 1000,
            concurrency: 8,
            read_ratio: 0.8,
        }
    }
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub units: usize,
    pub reads: usize,
    pub writes: usize,
    pub rejected: usize,
    pub per_target: BTreeMap<String, usize>,
}

impl SimulationReport {
    fn merge(&mut self, other: SimulationReport) {
        self.units += other.units;
        self.reads += other.reads;
        self.writes += other.writes;
        self.rejected += other.rejected;
        for (target, count) in other.per_target {
            *self.per_target.entry(target).or_default() += count;
        }
    }
}

/// Drive `params.units` units of work through `source`.
///
/// A read ratio outside `[0, 1]` (NaN included) is rejected before any
/// worker starts; a worker that panics fails the whole run.
pub async fn run_simulation<R>(
    source: Arc<RoutingDataSource<Arc<DataSourceHandle>, R>>,
    params: SimulationParams,
) -> Result<SimulationReport, SimulationError>
where
    R: ConnectionRouter + 'static,
{
    let read_ratio = params.read_ratio;
    if !(0.0..=1.0).contains(&read_ratio) {
        return Err(SimulationError::InvalidReadRatio(read_ratio));
    }
    let concurrency = params.concurrency.max(1);

    tracing::info!(
        units = params.units,
        concurrency,
        read_ratio,
        "Starting simulation"
    );

    let mut tasks = Vec::with_capacity(concurrency);
    for worker in 0..concurrency {
        let share = params.units / concurrency + usize::from(worker < params.units % concurrency);
        let source = source.clone();
        tasks.push(tokio::spawn(async move {
            let mut report = SimulationReport::default();
            for _ in 0..share {
                let read_only = rand::thread_rng().gen_bool(read_ratio);
                let unit = UnitOfWork::new(read_only);

                report.units += 1;
                if read_only {
                    report.reads += 1;
                } else {
                    report.writes += 1;
                }

                match source.acquire(&unit) {
                    Ok(permit) => {
                        *report.per_target.entry(permit.name().to_string()).or_default() += 1;
                        tokio::task::yield_now().await;
                        drop(permit);
                    }
                    Err(RoutingError::PoolExhausted { .. }) => report.rejected += 1,
                    Err(e) => {
                        tracing::error!(worker, error = %e, "Unit of work failed to route");
                        report.rejected += 1;
                    }
                }
            }
            report
        }));
    }

    let mut total = SimulationReport::default();
    for task in tasks {
        let report = task.await.map_err(|e| {
            tracing::error!(error = %e, "Simulation worker failed");
            SimulationError::from(e)
        })?;
        total.merge(report);
    }

    tracing::info!(
        units = total.units,
        rejected = total.rejected,
        "Simulation finished"
    );
    Ok(total)
}
