//! Rule-table configuration (buildguard.toml)
//!
//! Lets a host extend the built-in classification table without touching
//! control flow: extra rules are appended after the built-ins, or replace
//! them entirely when `replace_builtin` is set.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::rules::{builtin_rules, BuildOutcome, ClassifyRule, LogClassifier, Severity};

/// Error types for config operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// One configured classification rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Severity the line must carry
    pub severity: Severity,

    /// Case-sensitive substring the message must contain
    pub contains: String,

    /// Outcome reported on match; `other` makes this a suppression rule
    pub outcome: BuildOutcome,
}

impl RuleSpec {
    fn to_rule(&self) -> ClassifyRule {
        ClassifyRule::new(self.severity, self.contains.clone(), self.outcome)
    }
}

/// Classifier configuration from a TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Drop the built-in table and use only the configured rules.
    /// Needed when a configured rule must take precedence over a built-in.
    #[serde(default)]
    pub replace_builtin: bool,

    /// Extra rules, evaluated after the built-in table unless
    /// `replace_builtin` is set
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl RulesConfig {
    /// Load and parse config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    /// Parse config from a TOML string
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: RulesConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Rule: an empty needle would match every line of its severity
        for rule in &self.rules {
            if rule.contains.is_empty() {
                return Err(ConfigError::ValidationError(
                    "Rule 'contains' must not be empty".to_string(),
                ));
            }
        }

        // Rule: replacing the built-ins with nothing disables detection
        if self.replace_builtin && self.rules.is_empty() {
            return Err(ConfigError::ValidationError(
                "replace_builtin requires at least one rule".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the effective classifier for this configuration
    pub fn to_classifier(&self) -> LogClassifier {
        let mut rules = if self.replace_builtin {
            Vec::with_capacity(self.rules.len())
        } else {
            builtin_rules()
        };
        rules.extend(self.rules.iter().map(RuleSpec::to_rule));
        LogClassifier::new(rules)
    }
}
