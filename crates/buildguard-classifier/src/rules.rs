//! Severity model and the ordered, first-match-wins rule table.

use serde::{Deserialize, Serialize};

/// Needle for direct build-step errors ("Error building: ...").
pub const ERROR_BUILDING_NEEDLE: &str = "Error building";

/// Needle for the host's failed-build completion banner.
pub const BUILD_FAILED_NEEDLE: &str = "Build completed with a result of 'Failed'";

/// Type name of the exception the host raises when a build step fails.
pub const BUILD_FAILED_EXCEPTION_NEEDLE: &str = "BuildFailedException";

/// Needle for the host's cancelled-build completion banner.
pub const BUILD_CANCELLED_NEEDLE: &str = "Build completed with a result of 'Cancelled'";

/// Severity tag carried by every line of the host's diagnostic stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Log,
    /// Warning
    Warning,
    /// Error
    Error,
    /// Uncaught exception surfaced by the host runtime
    Exception,
}

/// Outcome recovered from a single log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildOutcome {
    /// The build aborted with a failure
    Failed,
    /// The build was cancelled
    Cancelled,
    /// The line carries no outcome signal
    Other,
}

impl BuildOutcome {
    /// Check whether this outcome terminates the build.
    pub fn is_abort(&self) -> bool {
        matches!(self, BuildOutcome::Failed | BuildOutcome::Cancelled)
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyRule {
    /// Severity the line must carry
    pub severity: Severity,

    /// Case-sensitive substring the message must contain
    pub needle: String,

    /// Outcome reported when the rule matches
    pub outcome: BuildOutcome,
}

impl ClassifyRule {
    /// Create a rule.
    pub fn new(severity: Severity, needle: impl Into<String>, outcome: BuildOutcome) -> Self {
        Self {
            severity,
            needle: needle.into(),
            outcome,
        }
    }

    /// Check whether this rule matches the given line.
    pub fn matches(&self, message: &str, severity: Severity) -> bool {
        self.severity == severity && message.contains(&self.needle)
    }
}

/// The built-in rule table, in priority order.
pub fn builtin_rules() -> Vec<ClassifyRule> {
    vec![
        ClassifyRule::new(Severity::Error, ERROR_BUILDING_NEEDLE, BuildOutcome::Failed),
        ClassifyRule::new(Severity::Error, BUILD_FAILED_NEEDLE, BuildOutcome::Failed),
        ClassifyRule::new(
            Severity::Exception,
            BUILD_FAILED_EXCEPTION_NEEDLE,
            BuildOutcome::Failed,
        ),
        ClassifyRule::new(Severity::Log, BUILD_CANCELLED_NEEDLE, BuildOutcome::Cancelled),
    ]
}

/// Ordered log-line classifier.
///
/// Rules are evaluated top-to-bottom and the first match wins; a rule mapping
/// to [`BuildOutcome::Other`] is therefore a suppression entry. An empty table
/// classifies everything as `Other`.
#[derive(Debug, Clone)]
pub struct LogClassifier {
    rules: Vec<ClassifyRule>,
}

impl LogClassifier {
    /// Create a classifier from an explicit rule table.
    pub fn new(rules: Vec<ClassifyRule>) -> Self {
        Self { rules }
    }

    /// Classify a single log line.
    ///
    /// This is a pure function: `(message, severity) -> BuildOutcome`.
    /// Substring matching is case-sensitive and unanchored.
    pub fn classify(&self, message: &str, severity: Severity) -> BuildOutcome {
        self.rules
            .iter()
            .find(|rule| rule.matches(message, severity))
            .map(|rule| rule.outcome)
            .unwrap_or(BuildOutcome::Other)
    }

    /// The effective rule table, in evaluation order.
    pub fn rules(&self) -> &[ClassifyRule] {
        &self.rules
    }
}

impl Default for LogClassifier {
    fn default() -> Self {
        Self::new(builtin_rules())
    }
}
