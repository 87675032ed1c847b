//! Log-line outcome classifier for build abort recovery.
//!
//! The host build pipeline reports success through its lifecycle hooks, but
//! failures and cancellations surface only as free-form diagnostic log lines.
//! This crate classifies each `(message, severity)` pair against an ordered
//! rule table and reports the recovered outcome. It is deliberately a
//! heuristic substring matcher, not a log parser.

mod config;
mod rules;
mod snapshot;

pub use config::{ConfigError, RuleSpec, RulesConfig};
pub use rules::{builtin_rules, BuildOutcome, ClassifyRule, LogClassifier, Severity};
pub use rules::{
    BUILD_CANCELLED_NEEDLE, BUILD_FAILED_EXCEPTION_NEEDLE, BUILD_FAILED_NEEDLE,
    ERROR_BUILDING_NEEDLE,
};
pub use snapshot::RulesSnapshot;
