//! Recording test doubles: a participant that logs every hook call with
//! optional per-hook failure injection, and an error sink that captures
//! contained dispatch errors.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use buildguard_classifier::BuildOutcome;

use crate::error::{DispatchErrorSink, HookError};
use crate::participant::BuildParticipant;
use crate::report::BuildReport;

/// The four participant hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Preprocess,
    Postprocess,
    BuildFailed,
    BuildCancelled,
}

/// Participant that records every hook invocation.
///
/// Hooks scripted via [`RecordingParticipant::with_failure`] still record
/// their invocation, then return an error.
pub struct RecordingParticipant {
    name: String,
    order: i32,
    events: RefCell<Vec<(Hook, String)>>,
    failures: HashSet<Hook>,
}

impl RecordingParticipant {
    /// Create a participant with callback order 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: 0,
            events: RefCell::new(Vec::new()),
            failures: HashSet::new(),
        }
    }

    /// Set the callback order.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Script `hook` to return an error after recording its invocation.
    pub fn with_failure(mut self, hook: Hook) -> Self {
        self.failures.insert(hook);
        self
    }

    /// Participant name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every recorded `(hook, build_id)` pair, in invocation order.
    pub fn events(&self) -> Vec<(Hook, String)> {
        self.events.borrow().clone()
    }

    /// How many times `hook` was invoked.
    pub fn hook_count(&self, hook: Hook) -> usize {
        self.events.borrow().iter().filter(|(h, _)| *h == hook).count()
    }

    fn record(&self, hook: Hook, report: &BuildReport) -> Result<(), HookError> {
        self.events.borrow_mut().push((hook, report.build_id.clone()));
        if self.failures.contains(&hook) {
            return Err(HookError::msg(format!(
                "{} refused {:?} hook",
                self.name, hook
            )));
        }
        Ok(())
    }
}

impl BuildParticipant for RecordingParticipant {
    fn callback_order(&self) -> i32 {
        self.order
    }

    fn on_preprocess(&self, report: &BuildReport) -> Result<(), HookError> {
        self.record(Hook::Preprocess, report)
    }

    fn on_postprocess(&self, report: &BuildReport) -> Result<(), HookError> {
        self.record(Hook::Postprocess, report)
    }

    fn on_build_failed(&self, report: &BuildReport) -> Result<(), HookError> {
        self.record(Hook::BuildFailed, report)
    }

    fn on_build_cancelled(&self, report: &BuildReport) -> Result<(), HookError> {
        self.record(Hook::BuildCancelled, report)
    }
}

/// Error sink that captures contained hook errors for assertions.
///
/// Clones share the same buffer, so a clone handed to
/// [`BuildNotifier::with_parts`](crate::notifier::BuildNotifier::with_parts)
/// stays readable from the test.
#[derive(Clone, Default)]
pub struct RecordingSink {
    errors: Rc<RefCell<Vec<(BuildOutcome, String)>>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(outcome, error message)` pair reported so far.
    pub fn errors(&self) -> Vec<(BuildOutcome, String)> {
        self.errors.borrow().clone()
    }
}

impl DispatchErrorSink for RecordingSink {
    fn report(&self, outcome: BuildOutcome, error: &HookError) {
        self.errors.borrow_mut().push((outcome, error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_participant_records_and_fails() {
        let participant =
            RecordingParticipant::new("cache-warmer").with_failure(Hook::BuildFailed);
        let report = BuildReport::new("ios");

        assert!(participant.on_preprocess(&report).is_ok());
        assert!(participant.on_build_failed(&report).is_err());

        assert_eq!(participant.hook_count(Hook::Preprocess), 1);
        assert_eq!(participant.hook_count(Hook::BuildFailed), 1);
        assert_eq!(participant.hook_count(Hook::Postprocess), 0);
        assert_eq!(
            participant.events(),
            vec![
                (Hook::Preprocess, report.build_id.clone()),
                (Hook::BuildFailed, report.build_id.clone()),
            ]
        );
    }

    #[test]
    fn test_recording_sink_shares_buffer_across_clones() {
        let sink = RecordingSink::new();
        let clone = sink.clone();

        clone.report(BuildOutcome::Failed, &HookError::msg("boom"));

        let errors = sink.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, BuildOutcome::Failed);
        assert_eq!(errors[0].1, "boom");
    }
}
