//! Data-source handle abstraction.
//!
//! # Responsibilities
//! - Describe a single configured endpoint (URL, credentials, role)
//! - Track active connections against the endpoint's limit
//! - Hand out RAII permits that release their slot on drop
//!
//! # Design Decisions
//! - Handles never open sockets; a driver plugs in through `DataSourceFactory`
//! - Connection limit is enforced with a CAS loop, no lock

use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;
use crate::config::DataSourceConfig;
use crate::observability::metrics;
use crate::routing::{DataSourceRole, RoleClassifier, RoutingError};

/// Resolved description of one endpoint.
#[derive(Clone)]
pub struct DataSourceDescriptor {
    pub name: String,
    pub url: Url,
    pub username: String,
    pub password: String,
    pub role: DataSourceRole,
    pub max_connections: usize,
}

impl std::fmt::Debug for DataSourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSourceDescriptor")
            .field("name", &self.name)
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"***")
            .field("role", &self.role)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DataSourceDescriptor {
    /// Expand config into descriptors: primary first, then replicas in order.
    pub fn from_config(config: &DataSourceConfig) -> Result<Vec<Self>, RoutingError> {
        let classifier = RoleClassifier::new(config.replica_marker.clone());
        let mut descriptors = Vec::with_capacity(config.replicas.len() + 1);

        descriptors.push(Self {
            name: config.primary_name.clone(),
            url: parse_url(&config.primary_name, &config.url)?,
            username: config.username.clone(),
            password: config.password.clone(),
            role: DataSourceRole::Primary,
            max_connections: connection_limit(&config.primary_name, config.max_connections)?,
        });

        for replica in &config.replicas {
            let role = classifier.classify(&replica.name, replica.role);
            match role {
                DataSourceRole::Primary => {
                    return Err(RoutingError::InvalidConfiguration(format!(
                        "replica {} may not declare role primary",
                        replica.name
                    )));
                }
                DataSourceRole::Standby if replica.role.is_none() => {
                    tracing::warn!(
                        datasource = %replica.name,
                        marker = %classifier.marker(),
                        "Data source has no role and no replica marker; registering as standby"
                    );
                }
                _ => {}
            }
            let max_connections = replica.max_connections.unwrap_or(config.max_connections);
            descriptors.push(Self {
                name: replica.name.clone(),
                url: parse_url(&replica.name, &replica.url)?,
                username: replica.username.clone().unwrap_or_else(|| config.username.clone()),
                password: replica.password.clone().unwrap_or_else(|| config.password.clone()),
                role,
                max_connections: connection_limit(&replica.name, max_connections)?,
            });
        }

        Ok(descriptors)
    }
}

fn connection_limit(name: &str, max_connections: usize) -> Result<usize, RoutingError> {
    if max_connections == 0 {
        return Err(RoutingError::InvalidConfiguration(format!(
            "datasource {}: max_connections must be greater than zero",
            name
        )));
    }
    Ok(max_connections)
}

fn parse_url(name: &str, raw: &str) -> Result<Url, RoutingError> {
    Url::parse(raw).map_err(|e| {
        RoutingError::InvalidConfiguration(format!("datasource {}: invalid url {:?}: {}", name, raw, e))
    })
}

/// Builds connection-producing handles; the seam for a real pool or driver.
pub trait DataSourceFactory {
    type Handle;

    fn create(&self, descriptor: &DataSourceDescriptor) -> Result<Self::Handle, RoutingError>;
}

/// A single endpoint with connection accounting.
#[derive(Debug)]
pub struct DataSourceHandle {
    descriptor: DataSourceDescriptor,
    active_connections: AtomicUsize,
}

impl DataSourceHandle {
    pub fn new(descriptor: DataSourceDescriptor) -> Self {
        Self {
            descriptor,
            active_connections: AtomicUsize::new(0),
        }
    }

    pub fn descriptor(&self) -> &DataSourceDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn url(&self) -> &Url {
        &self.descriptor.url
    }

    pub fn role(&self) -> DataSourceRole {
        self.descriptor.role
    }

    /// Get the current number of active connections.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Try to take a connection slot. `None` when the handle is saturated.
    pub fn try_acquire(self: &Arc<Self>) -> Option<ConnectionPermit> {
        let mut prev = self.active_connections.load(Ordering::Relaxed);
        loop {
            if prev >= self.descriptor.max_connections {
                return None;
            }
            match self.active_connections.compare_exchange_weak(
                prev, prev + 1, Ordering::Relaxed, Ordering::Relaxed
            ) {
                Ok(_) => break,
                Err(x) => prev = x,
            }
        }
        metrics::record_active_connections(&self.descriptor.name, prev + 1);
        Some(ConnectionPermit {
            handle: self.clone(),
        })
    }

    fn release(&self) {
        let remaining = self.active_connections.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        metrics::record_active_connections(&self.descriptor.name, remaining);
    }
}

/// A RAII guard holding one connection slot on a handle.
#[derive(Debug)]
pub struct ConnectionPermit {
    handle: Arc<DataSourceHandle>,
}

impl ConnectionPermit {
    pub fn handle(&self) -> &Arc<DataSourceHandle> {
        &self.handle
    }
}

impl Deref for ConnectionPermit {
    type Target = DataSourceHandle;
    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        self.handle.release();
    }
}

/// Default factory: one in-memory `DataSourceHandle` per descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleDataSourceFactory;

impl DataSourceFactory for SimpleDataSourceFactory {
    type Handle = Arc<DataSourceHandle>;

    fn create(&self, descriptor: &DataSourceDescriptor) -> Result<Self::Handle, RoutingError> {
        Ok(Arc::new(DataSourceHandle::new(descriptor.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReplicaConfig;

    fn config() -> DataSourceConfig {
        let mut config = DataSourceConfig {
            username: "app".into(),
            password: "secret".into(),
            ..DataSourceConfig::default()
        };
        config.replicas.push(ReplicaConfig::new("slave1", "mysql://10.0.0.2:3306/app"));
        let mut reporting = ReplicaConfig::new("reporting", "mysql://10.0.0.3:3306/app");
        reporting.username = Some("report".into());
        reporting.max_connections = Some(2);
        config.replicas.push(reporting);
        config
    }

    #[test]
    fn test_descriptors_from_config() {
        let descriptors = DataSourceDescriptor::from_config(&config()).unwrap();
        let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["master", "slave1", "reporting"]);

        assert_eq!(descriptors[0].role, DataSourceRole::Primary);
        assert_eq!(descriptors[1].role, DataSourceRole::Replica);
        assert_eq!(descriptors[1].username, "app");
        assert_eq!(descriptors[1].password, "secret");
        assert_eq!(descriptors[2].role, DataSourceRole::Standby);
        assert_eq!(descriptors[2].username, "report");
        assert_eq!(descriptors[2].max_connections, 2);
    }

    #[test]
    fn test_bad_url_is_invalid_configuration() {
        let mut config = config();
        config.replicas[0].url = "::nope".into();
        let err = DataSourceDescriptor::from_config(&config).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_connection_limit_is_invalid_configuration() {
        let mut zero_replica = config();
        zero_replica.replicas[1].max_connections = Some(0);
        let err = DataSourceDescriptor::from_config(&zero_replica).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidConfiguration(ref m) if m.contains("reporting")));

        let mut zero_default = config();
        zero_default.max_connections = 0;
        let err = DataSourceDescriptor::from_config(&zero_default).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidConfiguration(ref m) if m.contains("master")));
    }

    #[test]
    fn test_standby_warning_logged_once() {
        use std::sync::atomic::AtomicUsize;
        use tracing_subscriber::layer::{Context, SubscriberExt};
        use crate::config::{validation::validate_config, AppConfig};

        struct WarnCounter(Arc<AtomicUsize>);

        impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                if *event.metadata().level() == tracing::Level::WARN {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let app = AppConfig {
            datasource: config(),
            ..AppConfig::default()
        };

        tracing::subscriber::with_default(subscriber, || {
            validate_config(&app).unwrap();
            DataSourceDescriptor::from_config(&app.datasource).unwrap();
        });

        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_active_connection_gauge_follows_permits() {
        use metrics_exporter_prometheus::PrometheusBuilder;

        let recorder = PrometheusBuilder::new().build_recorder();
        let prometheus = recorder.handle();
        let descriptors = DataSourceDescriptor::from_config(&config()).unwrap();
        let handle = SimpleDataSourceFactory.create(&descriptors[2]).unwrap();

        let gauge = |rendered: &str| -> Option<String> {
            rendered
                .lines()
                .find(|l| l.starts_with("datasource_active_connections{") && l.contains("target=\"reporting\""))
                .and_then(|l| l.rsplit(' ').next())
                .map(str::to_string)
        };

        ::metrics::with_local_recorder(&recorder, || {
            let p1 = handle.try_acquire().unwrap();
            let p2 = handle.try_acquire().unwrap();
            assert_eq!(gauge(&prometheus.render()).as_deref(), Some("2"));

            drop(p1);
            assert_eq!(gauge(&prometheus.render()).as_deref(), Some("1"));
            drop(p2);
        });

        assert_eq!(gauge(&prometheus.render()).as_deref(), Some("0"));
    }

    #[test]
    fn test_debug_hides_password() {
        let descriptors = DataSourceDescriptor::from_config(&config()).unwrap();
        let rendered = format!("{:?}", descriptors[0]);
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_permit_limit_and_release() {
        let descriptors = DataSourceDescriptor::from_config(&config()).unwrap();
        let handle = SimpleDataSourceFactory.create(&descriptors[2]).unwrap();

        let p1 = handle.try_acquire().unwrap();
        let p2 = handle.try_acquire().unwrap();
        assert_eq!(handle.active_connections(), 2);
        assert!(handle.try_acquire().is_none());

        drop(p1);
        assert_eq!(handle.active_connections(), 1);
        assert_eq!(p2.name(), "reporting");
        drop(p2);
        assert_eq!(handle.active_connections(), 0);
    }
}
