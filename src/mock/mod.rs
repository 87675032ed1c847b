//! Mock build host for exercising the notifier without a real pipeline.
//!
//! Reproduces the host contract: preprocess hooks in callback order, a
//! diagnostic line announcing an abort, postprocess hooks only on success.

mod recording;

pub use recording::{Hook, RecordingParticipant, RecordingSink};

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::HookError;
use crate::notifier::BuildNotifier;
use crate::participant::ParticipantRef;
use crate::report::BuildReport;
use crate::stream::DiagnosticLog;

/// Scripted outcome for one simulated build attempt.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Build runs to completion; postprocess hooks fire
    Succeed,
    /// Build aborts; the host emits its error line and failed banner
    Fail {
        /// Detail appended to the "Error building" line
        message: String,
    },
    /// Build is cancelled; the host emits its cancellation banner
    Cancel,
}

impl ScriptedOutcome {
    /// Shorthand for a failing build.
    pub fn fail(message: impl Into<String>) -> Self {
        ScriptedOutcome::Fail {
            message: message.into(),
        }
    }
}

/// Mock host pipeline: owns the diagnostic log and a notifier handle, and
/// drives the guaranteed lifecycle hooks the way the real host does.
pub struct MockBuildHost {
    log: Rc<DiagnosticLog>,
    notifier: BuildNotifier,
    participants: RefCell<Vec<ParticipantRef>>,
}

impl MockBuildHost {
    /// Create a host around a fresh notifier with built-in rules.
    pub fn new() -> Self {
        Self::with_notifier(BuildNotifier::new())
    }

    /// Create a host around an existing notifier; the notifier is attached
    /// to this host's diagnostic log.
    pub fn with_notifier(notifier: BuildNotifier) -> Self {
        let log = Rc::new(DiagnosticLog::new());
        notifier.attach(&log);
        Self {
            log,
            notifier,
            participants: RefCell::new(Vec::new()),
        }
    }

    /// Add a participant to every subsequent build.
    pub fn add_participant(&self, participant: ParticipantRef) {
        self.participants.borrow_mut().push(participant);
    }

    /// The host's diagnostic log.
    pub fn log(&self) -> &Rc<DiagnosticLog> {
        &self.log
    }

    /// The notifier driving outcome recovery.
    pub fn notifier(&self) -> &BuildNotifier {
        &self.notifier
    }

    /// Run one simulated build attempt for `target`.
    ///
    /// A preprocess error aborts the attempt: the host surfaces it through
    /// the diagnostic stream as its build-failure exception and returns the
    /// error, exactly as the real pipeline would re-raise it.
    pub fn run_build(
        &self,
        target: &str,
        script: ScriptedOutcome,
    ) -> Result<BuildReport, HookError> {
        let report = BuildReport::new(target);

        let mut ordered: Vec<ParticipantRef> = self.participants.borrow().clone();
        ordered.sort_by_key(|p| p.callback_order());

        for participant in &ordered {
            if let Err(error) = self.notifier.preprocess_build(participant, &report) {
                self.log.exception(
                    format!("BuildFailedException: {error}"),
                    format!("preprocess hook for build {}", report.build_id),
                );
                return Err(error);
            }
        }

        match script {
            ScriptedOutcome::Succeed => {
                for participant in &ordered {
                    self.notifier.postprocess_build(participant, &report)?;
                }
                self.log.log("Build completed with a result of 'Succeeded'");
            }
            ScriptedOutcome::Fail { message } => {
                // The real host emits both lines; the second one lands on an
                // already-empty registration set.
                self.log.error(format!("Error building: {message}"));
                self.log.error("Build completed with a result of 'Failed'");
            }
            ScriptedOutcome::Cancel => {
                self.log.log("Build completed with a result of 'Cancelled'.");
            }
        }

        Ok(report)
    }
}

impl Default for MockBuildHost {
    fn default() -> Self {
        Self::new()
    }
}
