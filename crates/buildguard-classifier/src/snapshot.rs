//! Rule-set snapshot (classifier_rules.json)
//!
//! Captures the effective rule table at a point in time for auditability.
//! The SHA-256 of the canonical JSON identifies which table a recovered
//! outcome was classified under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

use crate::rules::{ClassifyRule, LogClassifier};

/// Schema version for classifier_rules.json
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "buildguard/classifier_rules@1";

/// Snapshot of an effective rule table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesSnapshot {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this snapshot was created
    pub created_at: DateTime<Utc>,

    /// The rule table, in evaluation order
    pub rules: Vec<ClassifyRule>,
}

impl RulesSnapshot {
    /// Snapshot the effective table of a classifier
    pub fn of(classifier: &LogClassifier) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            rules: classifier.rules().to_vec(),
        }
    }

    /// Serialize to canonical JSON (compact form, used for hashing)
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty JSON for human reading
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Compute SHA-256 hash of the canonical JSON representation
    pub fn sha256(&self) -> Result<String, serde_json::Error> {
        let canonical = self.to_canonical_json()?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let result = hasher.finalize();
        Ok(hex::encode(result))
    }

    /// Write to a file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }
}
