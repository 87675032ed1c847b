//! Participant contract for build lifecycle notifications.

use std::rc::Rc;

use crate::error::HookError;
use crate::report::BuildReport;

/// A unit of logic that reacts to all four real outcomes of a build.
///
/// The host pipeline only guarantees the preprocess/postprocess pair for
/// builds that succeed; registering with a
/// [`BuildNotifier`](crate::notifier::BuildNotifier) recovers the failed and
/// cancelled outcomes as well. Hooks take `&self` because the host model is
/// single-threaded; implementors keep mutable state in `Cell`/`RefCell`.
pub trait BuildParticipant {
    /// Ordering hint the host uses to sequence participants' preprocess and
    /// postprocess calls; lower orders run first. Not consulted during
    /// failure/cancellation fan-out, which always runs in registration order.
    fn callback_order(&self) -> i32 {
        0
    }

    /// Called before the build starts.
    fn on_preprocess(&self, report: &BuildReport) -> Result<(), HookError>;

    /// Called after a successful build.
    fn on_postprocess(&self, report: &BuildReport) -> Result<(), HookError>;

    /// Called when the build aborted with a failure. Invoked only by the
    /// notifier's fan-out, never by the host directly.
    fn on_build_failed(&self, report: &BuildReport) -> Result<(), HookError>;

    /// Called when the build was cancelled. Invoked only by the notifier's
    /// fan-out, never by the host directly.
    fn on_build_cancelled(&self, report: &BuildReport) -> Result<(), HookError>;
}

/// Shared participant handle, as held by hosts.
pub type ParticipantRef = Rc<dyn BuildParticipant>;

/// Pointer identity: two handles are the same participant when they share an
/// allocation.
pub(crate) fn same_participant(a: &ParticipantRef, b: &ParticipantRef) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl BuildParticipant for Noop {
        fn on_preprocess(&self, _report: &BuildReport) -> Result<(), HookError> {
            Ok(())
        }

        fn on_postprocess(&self, _report: &BuildReport) -> Result<(), HookError> {
            Ok(())
        }

        fn on_build_failed(&self, _report: &BuildReport) -> Result<(), HookError> {
            Ok(())
        }

        fn on_build_cancelled(&self, _report: &BuildReport) -> Result<(), HookError> {
            Ok(())
        }
    }

    #[test]
    fn test_default_callback_order() {
        let participant = Noop;
        assert_eq!(participant.callback_order(), 0);
    }

    #[test]
    fn test_same_participant_identity() {
        let a: ParticipantRef = Rc::new(Noop);
        let also_a = Rc::clone(&a);
        let b: ParticipantRef = Rc::new(Noop);

        assert!(same_participant(&a, &also_a));
        assert!(!same_participant(&a, &b));
    }
}
