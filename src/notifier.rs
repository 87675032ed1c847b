//! Shared dispatcher that recovers build aborts from the diagnostic log.
//!
//! The host pipeline guarantees the preprocess/postprocess hook pair only for
//! builds that succeed. The notifier keeps the set of participants whose
//! preprocess hook has run, watches the diagnostic stream for lines that
//! signal an abort, and fans the recovered failed/cancelled outcome out to
//! every participant the postprocess hook never reached.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use buildguard_classifier::{BuildOutcome, LogClassifier};
use tracing::debug;

use crate::error::{DispatchErrorSink, HookError, TracingSink};
use crate::participant::{same_participant, BuildParticipant, ParticipantRef};
use crate::report::BuildReport;
use crate::stream::{DiagnosticLog, LogRecord};

/// Subscription key the notifier uses on a [`DiagnosticLog`].
pub const LOG_SUBSCRIBER_KEY: &str = "buildguard-notifier";

type DeliverHook = fn(&dyn BuildParticipant, &BuildReport) -> Result<(), HookError>;

struct NotifierState {
    classifier: LogClassifier,
    /// Insertion-ordered registration set; weak so the notifier never owns a
    /// participant
    registered: RefCell<Vec<Weak<dyn BuildParticipant>>>,
    /// Most recently seen report handle, delivered on fan-out
    last_report: RefCell<Option<BuildReport>>,
    /// Reentrancy flag: set while a fan-out is delivering
    dispatching: Cell<bool>,
    sink: Box<dyn DispatchErrorSink>,
}

/// Process-wide dispatcher for build outcome notifications.
///
/// Construct one at host startup and hand clones of the handle to whatever
/// drives the build hooks; cloning is cheap and every clone shares the same
/// registration set.
///
/// Single build at a time is a precondition: only the most recently seen
/// report handle is retained, and it is the one delivered to every
/// participant on fan-out.
#[derive(Clone)]
pub struct BuildNotifier {
    state: Rc<NotifierState>,
}

impl BuildNotifier {
    /// Create a notifier with the built-in classification rules.
    pub fn new() -> Self {
        Self::with_classifier(LogClassifier::default())
    }

    /// Create a notifier with a custom rule table.
    pub fn with_classifier(classifier: LogClassifier) -> Self {
        Self::with_parts(classifier, Box::new(TracingSink))
    }

    /// Create a notifier with a custom rule table and error sink.
    pub fn with_parts(classifier: LogClassifier, sink: Box<dyn DispatchErrorSink>) -> Self {
        Self {
            state: Rc::new(NotifierState {
                classifier,
                registered: RefCell::new(Vec::new()),
                last_report: RefCell::new(None),
                dispatching: Cell::new(false),
                sink,
            }),
        }
    }

    /// Subscribe to a diagnostic log.
    ///
    /// Idempotent: an existing subscription under [`LOG_SUBSCRIBER_KEY`] is
    /// replaced, never duplicated, so repeated initialization cannot
    /// double-deliver. The subscription holds only a weak handle back to the
    /// notifier.
    pub fn attach(&self, log: &DiagnosticLog) {
        let weak = Rc::downgrade(&self.state);
        log.subscribe(
            LOG_SUBSCRIBER_KEY,
            Rc::new(move |record: &LogRecord| {
                if let Some(state) = weak.upgrade() {
                    state.observe(record);
                }
            }),
        );
    }

    /// Drop the subscription placed by [`BuildNotifier::attach`].
    pub fn detach(&self, log: &DiagnosticLog) {
        log.unsubscribe(LOG_SUBSCRIBER_KEY);
    }

    /// Host entry point for the pre-build hook.
    ///
    /// Registers the participant before delegating to its override, so a
    /// participant whose preprocess hook errors stays eligible for failure
    /// notification. The override's error propagates to the host.
    pub fn preprocess_build(
        &self,
        participant: &ParticipantRef,
        report: &BuildReport,
    ) -> Result<(), HookError> {
        self.register(participant, report);
        participant.on_preprocess(report)
    }

    /// Host entry point for the post-build hook of a successful build.
    pub fn postprocess_build(
        &self,
        participant: &ParticipantRef,
        report: &BuildReport,
    ) -> Result<(), HookError> {
        self.unregister(participant, report);
        participant.on_postprocess(report)
    }

    /// Add a participant to the registration set if absent and record the
    /// report as the last-seen handle. Pure bookkeeping, no error path.
    pub fn register(&self, participant: &ParticipantRef, report: &BuildReport) {
        *self.state.last_report.borrow_mut() = Some(report.clone());

        let mut registered = self.state.registered.borrow_mut();
        let present = registered.iter().any(|weak| {
            weak.upgrade()
                .is_some_and(|live| same_participant(&live, participant))
        });
        if !present {
            registered.push(Rc::downgrade(participant));
        }
    }

    /// Remove a participant from the registration set and record the report
    /// as the last-seen handle. Removing an absent participant is a no-op:
    /// a prior fan-out may already have cleared the set.
    pub fn unregister(&self, participant: &ParticipantRef, report: &BuildReport) {
        *self.state.last_report.borrow_mut() = Some(report.clone());

        self.state.registered.borrow_mut().retain(|weak| {
            weak.upgrade()
                .is_some_and(|live| !same_participant(&live, participant))
        });
    }

    /// Number of currently registered participants (live handles only).
    pub fn registered_count(&self) -> usize {
        self.state
            .registered
            .borrow()
            .iter()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }

    /// Feed one diagnostic line to the notifier.
    ///
    /// This is the entry point [`BuildNotifier::attach`] wires to a log
    /// stream; hosts without a [`DiagnosticLog`] can call it directly. A line
    /// arriving while a fan-out is in progress is dropped, not queued.
    pub fn observe_log(&self, record: &LogRecord) {
        self.state.observe(record);
    }
}

impl Default for BuildNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifierState {
    fn observe(&self, record: &LogRecord) {
        // A matching line emitted from inside a participant's own outcome
        // hook must not start a nested fan-out.
        if self.dispatching.get() {
            return;
        }

        let outcome = self.classifier.classify(&record.message, record.severity);
        if !outcome.is_abort() {
            return;
        }

        self.dispatching.set(true);
        self.fan_out(outcome);
        self.dispatching.set(false);
    }

    fn fan_out(&self, outcome: BuildOutcome) {
        let deliver: DeliverHook = match outcome {
            BuildOutcome::Failed => |p, r| p.on_build_failed(r),
            BuildOutcome::Cancelled => |p, r| p.on_build_cancelled(r),
            BuildOutcome::Other => return,
        };

        // Snapshot up front: hook bodies may call back into the notifier.
        let snapshot: Vec<Weak<dyn BuildParticipant>> = self.registered.borrow().clone();
        let report = self.last_report.borrow().clone();

        let Some(report) = report else {
            // The set is only ever populated by register, which records a
            // report; nothing to deliver.
            self.registered.borrow_mut().clear();
            return;
        };

        debug!(
            ?outcome,
            participants = snapshot.len(),
            build_id = %report.build_id,
            "dispatching recovered build outcome"
        );

        for weak in &snapshot {
            let Some(participant) = weak.upgrade() else {
                continue;
            };
            if let Err(error) = deliver(participant.as_ref(), &report) {
                self.sink.report(outcome, &error);
            }
        }

        self.registered.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildguard_classifier::Severity;
    use std::cell::Cell;

    #[derive(Default)]
    struct Probe {
        failed: Cell<u32>,
        cancelled: Cell<u32>,
    }

    impl BuildParticipant for Probe {
        fn on_preprocess(&self, _report: &BuildReport) -> Result<(), HookError> {
            Ok(())
        }

        fn on_postprocess(&self, _report: &BuildReport) -> Result<(), HookError> {
            Ok(())
        }

        fn on_build_failed(&self, _report: &BuildReport) -> Result<(), HookError> {
            self.failed.set(self.failed.get() + 1);
            Ok(())
        }

        fn on_build_cancelled(&self, _report: &BuildReport) -> Result<(), HookError> {
            self.cancelled.set(self.cancelled.get() + 1);
            Ok(())
        }
    }

    fn probe() -> (Rc<Probe>, ParticipantRef) {
        let concrete = Rc::new(Probe::default());
        let as_participant: ParticipantRef = concrete.clone();
        (concrete, as_participant)
    }

    #[test]
    fn test_register_is_idempotent() {
        let notifier = BuildNotifier::new();
        let (_probe, participant) = probe();
        let report = BuildReport::new("ios");

        notifier.register(&participant, &report);
        notifier.register(&participant, &report);

        assert_eq!(notifier.registered_count(), 1);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let notifier = BuildNotifier::new();
        let (_probe, participant) = probe();
        let report = BuildReport::new("ios");

        notifier.unregister(&participant, &report);
        assert_eq!(notifier.registered_count(), 0);
    }

    #[test]
    fn test_dropped_participant_not_counted() {
        let notifier = BuildNotifier::new();
        let report = BuildReport::new("ios");

        let (concrete, participant) = probe();
        notifier.register(&participant, &report);
        assert_eq!(notifier.registered_count(), 1);

        drop(participant);
        drop(concrete);
        assert_eq!(notifier.registered_count(), 0);
    }

    #[test]
    fn test_dropped_participant_skipped_by_fan_out() {
        let notifier = BuildNotifier::new();
        let report = BuildReport::new("ios");

        let (survivor, survivor_ref) = probe();
        let (dropped, dropped_ref) = probe();
        notifier.register(&dropped_ref, &report);
        notifier.register(&survivor_ref, &report);
        drop(dropped_ref);
        drop(dropped);

        notifier.observe_log(&LogRecord::new(
            Severity::Error,
            "Error building: out of memory",
            "",
        ));

        assert_eq!(survivor.failed.get(), 1);
        assert_eq!(notifier.registered_count(), 0);
    }

    #[test]
    fn test_other_line_has_no_effect() {
        let notifier = BuildNotifier::new();
        let (concrete, participant) = probe();
        let report = BuildReport::new("ios");

        notifier.register(&participant, &report);
        notifier.observe_log(&LogRecord::new(Severity::Log, "Asset import complete", ""));

        assert_eq!(concrete.failed.get(), 0);
        assert_eq!(concrete.cancelled.get(), 0);
        assert_eq!(notifier.registered_count(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let notifier = BuildNotifier::new();
        let clone = notifier.clone();
        let (_probe, participant) = probe();
        let report = BuildReport::new("ios");

        notifier.register(&participant, &report);
        assert_eq!(clone.registered_count(), 1);
    }
}
