//! Status reporting for long-running steps.
//!
//! Steps report through a [`StatusReporter`] and name the target of every
//! message explicitly, so no step changes how another step's output is routed.

use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Info,
    Pass,
    Fail,
    Error,
}

impl Status {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error => "error",
        }
    }
}

/// Where a status message is meant to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportTarget {
    /// Interactive console output.
    #[default]
    Console,
    /// Plain system log output, used while a step drives its own progress display.
    System,
}

impl ReportTarget {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::System => "system",
        }
    }
}

pub trait StatusReporter: Send + Sync {
    fn report(&self, target: ReportTarget, status: Status, message: &str);

    fn progress(&self, target: ReportTarget, step: &str, done: u64, total: Option<u64>);
}

/// Forwards status messages to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn report(&self, target: ReportTarget, status: Status, message: &str) {
        let surface = target.as_str();
        let label = status.as_str();
        match status {
            Status::Info | Status::Pass => info!(surface, status = label, "{message}"),
            Status::Fail => warn!(surface, status = label, "{message}"),
            Status::Error => error!(surface, status = label, "{message}"),
        }
    }

    fn progress(&self, target: ReportTarget, step: &str, done: u64, total: Option<u64>) {
        let surface = target.as_str();
        match total {
            Some(total) if total > 0 => {
                let percent = done.saturating_mul(100) / total;
                debug!(
                    surface,
                    step,
                    done,
                    total,
                    progress = format!("{percent}%"),
                    "Progress"
                );
            }
            _ => debug!(surface, step, done, "Progress"),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{ReportTarget, Status, StatusReporter};
    use std::sync::Mutex;

    /// Records every message for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingReporter {
        pub messages: Mutex<Vec<(ReportTarget, Status, String)>>,
        pub progress: Mutex<Vec<(ReportTarget, String, u64)>>,
    }

    impl StatusReporter for RecordingReporter {
        fn report(&self, target: ReportTarget, status: Status, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push((target, status, message.to_string()));
        }

        fn progress(&self, target: ReportTarget, step: &str, done: u64, _total: Option<u64>) {
            self.progress
                .lock()
                .unwrap()
                .push((target, step.to_string(), done));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingReporter;
    use super::*;

    #[test]
    fn test_target_is_passed_per_call() {
        let reporter = RecordingReporter::default();
        reporter.report(ReportTarget::System, Status::Info, "unpacking");
        reporter.report(ReportTarget::Console, Status::Pass, "done");

        let messages = reporter.messages.lock().unwrap();
        assert_eq!(messages[0].0, ReportTarget::System);
        assert_eq!(messages[1].0, ReportTarget::Console);
        assert_eq!(messages[1].1, Status::Pass);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Status::Fail.as_str(), "fail");
        assert_eq!(ReportTarget::default(), ReportTarget::Console);
        assert_eq!(ReportTarget::System.as_str(), "system");
    }
}
