//! In-process model of the host's diagnostic log stream.
//!
//! The host delivers every diagnostic emitted anywhere in the process as a
//! `(message, stack_trace, severity)` tuple, synchronously and in emission
//! order. This bus reproduces that contract so the notifier's subscription
//! behavior is real and testable.

use std::cell::RefCell;
use std::rc::Rc;

use buildguard_classifier::Severity;

/// One line of the host's diagnostic feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Free-form message text
    pub message: String,

    /// Stack trace, empty for plain log lines
    pub stack_trace: String,

    /// Severity tag
    pub severity: Severity,
}

impl LogRecord {
    /// Create a record.
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        stack_trace: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            stack_trace: stack_trace.into(),
            severity,
        }
    }
}

/// Callback invoked for every emitted record.
pub type LogCallback = Rc<dyn Fn(&LogRecord)>;

struct Subscriber {
    key: String,
    callback: LogCallback,
}

/// Synchronous, ordered diagnostic log bus.
///
/// Subscriptions are keyed: subscribing under an existing key replaces the
/// previous callback, so repeated initialization never double-delivers.
/// Delivery iterates a snapshot of the subscriber list, which makes emitting
/// from inside a callback legal; the nested emission is simply not seen by
/// the in-progress delivery pass.
#[derive(Default)]
pub struct DiagnosticLog {
    subscribers: RefCell<Vec<Subscriber>>,
}

impl DiagnosticLog {
    /// Create an empty log bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe under `key`, replacing any existing subscription with the
    /// same key.
    pub fn subscribe(&self, key: impl Into<String>, callback: LogCallback) {
        let key = key.into();
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|s| s.key != key);
        subscribers.push(Subscriber { key, callback });
    }

    /// Remove the subscription under `key`, if any.
    pub fn unsubscribe(&self, key: &str) {
        self.subscribers.borrow_mut().retain(|s| s.key != key);
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Emit a record to every subscriber, in subscription order.
    pub fn emit(&self, record: LogRecord) {
        let snapshot: Vec<LogCallback> = self
            .subscribers
            .borrow()
            .iter()
            .map(|s| Rc::clone(&s.callback))
            .collect();
        for callback in snapshot {
            callback(&record);
        }
    }

    /// Emit an informational line.
    pub fn log(&self, message: impl Into<String>) {
        self.emit(LogRecord::new(Severity::Log, message, ""));
    }

    /// Emit a warning line.
    pub fn warning(&self, message: impl Into<String>) {
        self.emit(LogRecord::new(Severity::Warning, message, ""));
    }

    /// Emit an error line.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogRecord::new(Severity::Error, message, ""));
    }

    /// Emit an exception line with its stack trace.
    pub fn exception(&self, message: impl Into<String>, stack_trace: impl Into<String>) {
        self.emit(LogRecord::new(Severity::Exception, message, stack_trace));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(seen: &Rc<RefCell<Vec<String>>>, tag: &str) -> LogCallback {
        let seen = Rc::clone(seen);
        let tag = tag.to_string();
        Rc::new(move |record: &LogRecord| {
            seen.borrow_mut().push(format!("{}:{}", tag, record.message));
        })
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let log = DiagnosticLog::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        log.subscribe("first", recorder(&seen, "a"));
        log.subscribe("second", recorder(&seen, "b"));
        log.log("hello");

        assert_eq!(*seen.borrow(), vec!["a:hello", "b:hello"]);
    }

    #[test]
    fn test_subscribe_same_key_replaces() {
        let log = DiagnosticLog::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        log.subscribe("watcher", recorder(&seen, "old"));
        log.subscribe("watcher", recorder(&seen, "new"));
        log.log("once");

        assert_eq!(log.subscriber_count(), 1);
        assert_eq!(*seen.borrow(), vec!["new:once"]);
    }

    #[test]
    fn test_unsubscribe() {
        let log = DiagnosticLog::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        log.subscribe("watcher", recorder(&seen, "w"));
        log.unsubscribe("watcher");
        log.unsubscribe("never-subscribed");
        log.log("silence");

        assert_eq!(log.subscriber_count(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_reentrant_emit() {
        let log = Rc::new(DiagnosticLog::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let inner_log = Rc::clone(&log);
        let inner_seen = Rc::clone(&seen);
        log.subscribe(
            "echo",
            Rc::new(move |record: &LogRecord| {
                inner_seen.borrow_mut().push(record.message.clone());
                if record.message == "ping" {
                    inner_log.log("pong");
                }
            }),
        );

        log.log("ping");
        assert_eq!(*seen.borrow(), vec!["ping", "pong"]);
    }

    #[test]
    fn test_helper_severities() {
        let log = DiagnosticLog::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let records = Rc::clone(&seen);
        log.subscribe(
            "probe",
            Rc::new(move |record: &LogRecord| {
                records.borrow_mut().push(record.clone());
            }),
        );

        log.log("a");
        log.warning("b");
        log.error("c");
        log.exception("d", "at frame 0");

        let seen = seen.borrow();
        assert_eq!(seen[0].severity, Severity::Log);
        assert_eq!(seen[1].severity, Severity::Warning);
        assert_eq!(seen[2].severity, Severity::Error);
        assert_eq!(seen[3].severity, Severity::Exception);
        assert_eq!(seen[3].stack_trace, "at frame 0");
        assert!(seen[0].stack_trace.is_empty());
    }
}
