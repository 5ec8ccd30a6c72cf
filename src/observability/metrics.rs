//! Metrics collection and exposition.
//!
//! # Metrics
//! - `datasource_routes_total` (counter): routed units by target, mode
//! - `datasource_pool_exhausted_total` (counter): rejected acquisitions by target
//! - `datasource_active_connections` (gauge): permits held per target

use std::net::SocketAddr;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_route(target: &str, read_only: bool) {
    let mode = if read_only { "read" } else { "write" };
    ::metrics::counter!(
        "datasource_routes_total",
        "target" => target.to_string(),
        "mode" => mode
    )
    .increment(1);
}

pub fn record_pool_exhausted(target: &str) {
    ::metrics::counter!("datasource_pool_exhausted_total", "target" => target.to_string()).increment(1);
}

pub fn record_active_connections(target: &str, active: usize) {
    ::metrics::gauge!("datasource_active_connections", "target" => target.to_string()).set(active as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<'a>(rendered: &'a str, name: &str, labels: &[&str]) -> Option<&'a str> {
        rendered
            .lines()
            .find(|l| l.starts_with(name) && labels.iter().all(|label| l.contains(label)))
            .and_then(|l| l.rsplit(' ').next())
    }

    #[test]
    fn test_route_and_exhaustion_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            record_route("slave1", true);
            record_route("slave1", true);
            record_route("master", false);
            record_pool_exhausted("master");
        });

        let rendered = handle.render();
        assert_eq!(
            sample(&rendered, "datasource_routes_total{", &["target=\"slave1\"", "mode=\"read\""]),
            Some("2")
        );
        assert_eq!(
            sample(&rendered, "datasource_routes_total{", &["target=\"master\"", "mode=\"write\""]),
            Some("1")
        );
        assert_eq!(
            sample(&rendered, "datasource_pool_exhausted_total{", &["target=\"master\""]),
            Some("1")
        );
    }

    #[test]
    fn test_active_connections_gauge_is_overwritten() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            record_active_connections("slave2", 3);
            record_active_connections("slave2", 0);
        });

        let rendered = handle.render();
        assert_eq!(
            sample(&rendered, "datasource_active_connections{", &["target=\"slave2\""]),
            Some("0")
        );
    }
}
