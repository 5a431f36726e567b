//! Error types used by the cronvisor scheduler and its task ticks.
//!
//! This module defines three error enums:
//!
//! - [`ValidationError`]: a task descriptor was rejected at add-time.
//! - [`SchedulerError`]: errors returned by the programmatic API.
//! - [`ExecutionError`]: failures inside a tick (callback, deferred or stream).
//!   These never reach the API caller; they are logged and published as events.
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::tasks::ExecutionType;

/// # Rejections produced while validating a task descriptor.
///
/// Raised synchronously by `add`; the store is left unmodified.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Another task already uses this name.
    #[error("Task name '{name}' already registered")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// Another prioritized task already uses this priority.
    #[error("Task name '{name}' priority '{priority}' already registered")]
    DuplicatePriority {
        /// Name of the rejected task.
        name: String,
        /// The conflicting priority.
        priority: i64,
    },

    /// Cron task without a cron expression.
    #[error("Cron tasks require a valid cronTime")]
    MissingCronTime,

    /// Cron expression could not be parsed.
    #[error("Cron tasks require a valid cronTime: '{expr}' ({reason})")]
    InvalidCronTime {
        /// The expression as given.
        expr: String,
        /// Parser message.
        reason: String,
    },

    /// Timezone is not a known IANA identifier.
    #[error("{kind} tasks require a valid timeZone: '{zone}'")]
    InvalidTimeZone {
        /// Kind of the rejected task.
        kind: ExecutionType,
        /// The zone as given.
        zone: String,
    },

    /// Interval/Delay without a non-negative duration.
    #[error("{kind} tasks require a valid ms")]
    InvalidMs {
        /// Kind of the rejected task.
        kind: ExecutionType,
    },

    /// RunAt task without an instant.
    #[error("RunAt tasks require a valid runAt")]
    MissingRunAt,

    /// RunAt instant already passed.
    #[error("RunAt tasks require a future runAt date (got {run_at})")]
    PastRunAt {
        /// The rejected instant.
        run_at: DateTime<Utc>,
    },
}

impl ValidationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use cronvisor::ValidationError;
    ///
    /// let err = ValidationError::MissingCronTime;
    /// assert_eq!(err.as_label(), "validation_missing_cron_time");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ValidationError::DuplicateName { .. } => "validation_duplicate_name",
            ValidationError::DuplicatePriority { .. } => "validation_duplicate_priority",
            ValidationError::MissingCronTime => "validation_missing_cron_time",
            ValidationError::InvalidCronTime { .. } => "validation_invalid_cron_time",
            ValidationError::InvalidTimeZone { .. } => "validation_invalid_time_zone",
            ValidationError::InvalidMs { .. } => "validation_invalid_ms",
            ValidationError::MissingRunAt => "validation_missing_run_at",
            ValidationError::PastRunAt { .. } => "validation_past_run_at",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors returned by the scheduler API.
///
/// `add` fails with [`SchedulerError::Validation`]; every name-addressed
/// operation fails with [`SchedulerError::NotFound`] for unknown names.
/// The shutdown path reports [`SchedulerError::GraceExceeded`] and
/// [`SchedulerError::Signal`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The task descriptor was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation referenced a task name that is not registered.
    #[error("task '{name}' not found")]
    NotFound {
        /// The unknown name.
        name: String,
    },

    /// Ticks were still running when the shutdown grace period ran out.
    #[error("shutdown grace {grace:?} exceeded with {in_flight} tick(s) in flight")]
    GraceExceeded {
        /// The configured grace period.
        grace: Duration,
        /// Ticks still running at the deadline.
        in_flight: usize,
    },

    /// Termination signal listeners could not be installed.
    #[error("failed to listen for termination signals: {reason}")]
    Signal {
        /// The underlying I/O error message.
        reason: String,
    },
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use cronvisor::SchedulerError;
    ///
    /// let err = SchedulerError::NotFound { name: "nightly".into() };
    /// assert_eq!(err.as_label(), "scheduler_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::Validation(e) => e.as_label(),
            SchedulerError::NotFound { .. } => "scheduler_not_found",
            SchedulerError::GraceExceeded { .. } => "scheduler_grace_exceeded",
            SchedulerError::Signal { .. } => "scheduler_signal_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SchedulerError::Validation(e) => e.as_message(),
            SchedulerError::NotFound { name } => format!("not found: {name}"),
            SchedulerError::GraceExceeded { grace, in_flight } => {
                format!("grace exceeded after {grace:?}: {in_flight} in flight")
            }
            SchedulerError::Signal { reason } => format!("signal: {reason}"),
        }
    }

    /// True if this error is a [`SchedulerError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, SchedulerError::NotFound { .. })
    }
}

/// # Failures raised while a tick runs.
///
/// Contained inside the tick: logged through `tracing`, published as
/// `EventKind::TickFailed`, and never propagated to the API caller.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The callback itself returned an error.
    #[error("callback failed: {error}")]
    Callback {
        /// The underlying error message.
        error: String,
    },

    /// A deferred computation returned by the callback failed.
    #[error("deferred value failed: {error}")]
    Deferred {
        /// The underlying error message.
        error: String,
    },

    /// A stream returned by the callback yielded an error.
    #[error("stream value failed: {error}")]
    Stream {
        /// The underlying error message.
        error: String,
    },

    /// Resolution nested deeper than the configured limit.
    #[error("result nesting exceeded depth limit {limit}")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
    },
}

impl ExecutionError {
    /// Builds a [`ExecutionError::Callback`] from anything printable.
    ///
    /// Handy inside callbacks: `do_work().map_err(ExecutionError::fail)?`.
    pub fn fail(error: impl std::fmt::Display) -> Self {
        ExecutionError::Callback {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use cronvisor::ExecutionError;
    ///
    /// let err = ExecutionError::fail("boom");
    /// assert_eq!(err.as_label(), "execution_callback_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecutionError::Callback { .. } => "execution_callback_failed",
            ExecutionError::Deferred { .. } => "execution_deferred_failed",
            ExecutionError::Stream { .. } => "execution_stream_failed",
            ExecutionError::DepthExceeded { .. } => "execution_depth_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ExecutionError::Callback { error } => format!("callback: {error}"),
            ExecutionError::Deferred { error } => format!("deferred: {error}"),
            ExecutionError::Stream { error } => format!("stream: {error}"),
            ExecutionError::DepthExceeded { limit } => format!("depth > {limit}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_match_descriptor_wording() {
        let err = ValidationError::DuplicateName { name: "a".into() };
        assert_eq!(err.to_string(), "Task name 'a' already registered");

        let err = ValidationError::InvalidMs {
            kind: ExecutionType::Interval,
        };
        assert_eq!(err.to_string(), "Interval tasks require a valid ms");

        let err = ValidationError::InvalidTimeZone {
            kind: ExecutionType::RunAt,
            zone: "Mars/Olympus".into(),
        };
        assert_eq!(
            err.to_string(),
            "RunAt tasks require a valid timeZone: 'Mars/Olympus'"
        );
    }

    #[test]
    fn test_scheduler_error_wraps_validation() {
        let err: SchedulerError = ValidationError::MissingRunAt.into();
        assert_eq!(err.as_label(), "validation_missing_run_at");
        assert_eq!(err.to_string(), "RunAt tasks require a valid runAt");
        assert!(!err.is_not_found());
    }
}
