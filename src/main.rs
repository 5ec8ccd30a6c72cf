//! Primary/replica routing tool (v1)
//!
//! Loads a data-source configuration, builds the routing table and lets an
//! operator inspect it, resolve targets by hand, or drive a synthetic
//! concurrent workload through it.
//!
//! # Architecture Overview
//!
//! ```text
//!     replica-router.toml
//!            │
//!            ▼
//!     ┌─────────────┐    ┌──────────────────┐    ┌────────────────────┐
//!     │   config    │───▶│    datasource    │───▶│      routing       │
//!     │ load+check  │    │ handles per name │    │ primary | rotation │
//!     └─────────────┘    └────────┬─────────┘    └─────────┬──────────┘
//!                                 │                        │
//!     Unit of work (read_only) ───┴──────▶ target name ◀───┘
//!                                 │
//!                                 ▼
//!                        connection permit
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use clap::{Parser, Subcommand};

use replica_router::config::{load_config, AppConfig};
use replica_router::datasource::{RoutingDataSource, SimpleDataSourceFactory, UnitOfWork};
use replica_router::observability::{logging, metrics};
use replica_router::simulation::{run_simulation, SimulationParams};

#[derive(Parser)]
#[command(name = "replica-router")]
#[command(about = "Route units of work between a primary and its read replicas", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "replica-router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the routing table
    Check,
    /// Print the targets chosen for successive units of work
    Resolve {
        /// Treat the units as read-only
        #[arg(long)]
        read_only: bool,

        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Run a concurrent synthetic workload and report the distribution
    Simulate {
        #[arg(long, default_value_t = 1000)]
        units: usize,

        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        #[arg(long, default_value_t = 0.8, value_parser = parse_read_ratio)]
        read_ratio: f64,
    },
}

fn parse_read_ratio(raw: &str) -> Result<f64, String> {
    let ratio: f64 = raw.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(format!("read ratio must be between 0 and 1, got {}", raw))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config: AppConfig = load_config(&cli.config)?;
    logging::init_logging(&config.observability);

    tracing::info!(
        config = %cli.config.display(),
        primary = %config.datasource.primary_name,
        replicas = config.datasource.replicas.len(),
        read_routing = config.datasource.read_routing,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let source = RoutingDataSource::from_config(&config.datasource, &SimpleDataSourceFactory)?;

    match cli.command {
        Commands::Check => {
            println!("{}", serde_json::to_string_pretty(&source.summary())?);
        }
        Commands::Resolve { read_only, count } => {
            for _ in 0..count {
                let unit = UnitOfWork::new(read_only);
                let (target, _) = source.resolve(&unit)?;
                println!("{}", target);
            }
        }
        Commands::Simulate { units, concurrency, read_ratio } => {
            let params = SimulationParams { units, concurrency, read_ratio };
            let report = run_simulation(Arc::new(source), params).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
