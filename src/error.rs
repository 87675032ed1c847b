//! Hook errors and the dispatch error sink.

use buildguard_classifier::BuildOutcome;
use thiserror::Error;

/// Error raised by a participant hook.
///
/// Errors from preprocess/postprocess hooks propagate to the host unmodified;
/// errors from failed/cancelled hooks are contained by the notifier and
/// routed to a [`DispatchErrorSink`] so one broken participant cannot starve
/// the others of their notification.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HookError {
    /// Create a message-only hook error.
    pub fn msg(message: impl Into<String>) -> Self {
        HookError::Message(message.into())
    }
}

/// Sink for hook errors contained during failure/cancellation fan-out.
pub trait DispatchErrorSink {
    /// Report an error raised by a participant's outcome hook.
    fn report(&self, outcome: BuildOutcome, error: &HookError);
}

/// Default sink: emits the contained error as a tracing event.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DispatchErrorSink for TracingSink {
    fn report(&self, outcome: BuildOutcome, error: &HookError) {
        tracing::error!(?outcome, %error, "participant hook failed during dispatch");
    }
}
