//! # Trigger kinds.
//!
//! [`ExecutionType`] selects which execution adapter arms a task:
//!
//! | Kind       | Trigger                         | Recurring |
//! |------------|---------------------------------|-----------|
//! | `Cron`     | cron expression (+ timezone)    | yes       |
//! | `Interval` | fixed period in milliseconds    | yes       |
//! | `Delay`    | fixed delay in milliseconds     | no        |
//! | `RunAt`    | absolute instant (+ timezone)   | no        |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of trigger a task is armed with.
///
/// Serializes as `"Cron" | "Interval" | "Delay" | "RunAt"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionType {
    /// Recurring, driven by a cron expression.
    Cron,
    /// Recurring, fixed period.
    Interval,
    /// One-shot after a fixed delay.
    Delay,
    /// One-shot at an absolute instant.
    RunAt,
}

impl ExecutionType {
    /// Returns the wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionType::Cron => "Cron",
            ExecutionType::Interval => "Interval",
            ExecutionType::Delay => "Delay",
            ExecutionType::RunAt => "RunAt",
        }
    }

    /// True for kinds that keep ticking until stopped.
    pub fn is_recurring(&self) -> bool {
        matches!(self, ExecutionType::Cron | ExecutionType::Interval)
    }
}

impl fmt::Display for ExecutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&ExecutionType::RunAt).unwrap(),
            "\"RunAt\""
        );
        let kind: ExecutionType = serde_json::from_str("\"Interval\"").unwrap();
        assert_eq!(kind, ExecutionType::Interval);
    }

    #[test]
    fn test_is_recurring() {
        assert!(ExecutionType::Cron.is_recurring());
        assert!(ExecutionType::Interval.is_recurring());
        assert!(!ExecutionType::Delay.is_recurring());
        assert!(!ExecutionType::RunAt.is_recurring());
    }
}
