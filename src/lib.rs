//! Buildguard - build-lifecycle notifier
//!
//! The host build pipeline guarantees its preprocess and postprocess hooks
//! only for builds that succeed; an aborted build announces itself through
//! free-form diagnostic log lines instead, leaving any participant that
//! acquired a resource in preprocess with no paired release. Buildguard
//! classifies those lines and fans the recovered failed/cancelled outcome
//! out, exactly once, to every participant whose postprocess hook never ran.

pub mod error;
pub mod mock;
pub mod notifier;
pub mod participant;
pub mod report;
pub mod stream;

pub use buildguard_classifier as classifier;

pub use classifier::{
    builtin_rules, BuildOutcome, ClassifyRule, LogClassifier, RuleSpec, RulesConfig,
    RulesSnapshot, Severity,
};
pub use error::{DispatchErrorSink, HookError, TracingSink};
pub use notifier::{BuildNotifier, LOG_SUBSCRIBER_KEY};
pub use participant::{BuildParticipant, ParticipantRef};
pub use report::BuildReport;
pub use stream::{DiagnosticLog, LogCallback, LogRecord};
