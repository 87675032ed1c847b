//! Build report handle passed through all lifecycle hooks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque per-build context handle.
///
/// Supplied by the host at each hook call and passed through unmodified to
/// outcome hooks; the notifier only ever clones it. Handle identity is the
/// build id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Unique identifier for this build attempt
    pub build_id: String,

    /// Build target the host is producing (platform or product name)
    pub target: String,

    /// When the build attempt started
    pub started_at: DateTime<Utc>,
}

impl BuildReport {
    /// Create a report for a new build attempt.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            build_id: Uuid::new_v4().to_string(),
            target: target.into(),
            started_at: Utc::now(),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl PartialEq for BuildReport {
    fn eq(&self, other: &Self) -> bool {
        self.build_id == other.build_id
    }
}

impl Eq for BuildReport {}
