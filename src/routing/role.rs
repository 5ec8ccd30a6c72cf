//! Data-source role tags.
//!
//! # Responsibilities
//! - Tag every configured endpoint as Primary, Replica or Standby
//! - Infer a missing tag from the replica name marker
//!
//! # Design Decisions
//! - An explicit `role` in config always wins over the name marker
//! - Unmarked, untagged endpoints become Standby: registered, never rotated
//! - Classification is pure; the datasource layer logs inferred standbys

use serde::{Deserialize, Serialize};

/// Role of a configured data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceRole {
    /// Accepts writes; the default target.
    Primary,
    /// Eligible for read-only units of work.
    Replica,
    /// Registered by name but excluded from read rotation.
    Standby,
}

impl DataSourceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceRole::Primary => "primary",
            DataSourceRole::Replica => "replica",
            DataSourceRole::Standby => "standby",
        }
    }
}

impl std::fmt::Display for DataSourceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the role of a replica entry.
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    marker: String,
}

impl RoleClassifier {
    /// Create a classifier that treats names containing `marker` as replicas.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Role for a replica entry named `name` with an optional explicit tag.
    pub fn classify(&self, name: &str, explicit: Option<DataSourceRole>) -> DataSourceRole {
        if let Some(role) = explicit {
            return role;
        }
        if !self.marker.is_empty() && name.contains(&self.marker) {
            DataSourceRole::Replica
        } else {
            DataSourceRole::Standby
        }
    }
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self::new("slave")
    }
}
