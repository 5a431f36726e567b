//! # Per-task schedule options.
//!
//! [`ScheduleOptions`] carries every kind-specific field; which ones matter
//! depends on the [`ExecutionType`](crate::ExecutionType):
//!
//! - `Cron`: `cron_time` (required), `time_zone` (optional)
//! - `Interval` / `Delay`: `ms` (required, `>= 0`)
//! - `RunAt`: `run_at` (required, not in the past), `time_zone` (optional)
//! - all kinds: `priority` (optional, only used by the initial bulk activation)
//!
//! The serde shape uses the descriptor field names
//! (`priority`, `cronTime`, `ms`, `runAt`, `timeZone`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind-specific schedule fields of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOptions {
    /// Activation order hint for the initial table (lower first).
    /// Negative values are cleared to `None` when defaults are filled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    /// Cron expression (five fields minute-first, or six/seven fields second-first).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_time: Option<String>,

    /// Period (Interval) or delay (Delay, and RunAt after defaults) in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ms: Option<i64>,

    /// Target instant for RunAt tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_at: Option<DateTime<Utc>>,

    /// IANA zone identifier (e.g. `"Europe/Madrid"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl ScheduleOptions {
    /// Options for a cron task.
    pub fn cron(expr: impl Into<String>) -> Self {
        Self {
            cron_time: Some(expr.into()),
            ..Self::default()
        }
    }

    /// Options for an interval or delay task.
    pub fn ms(ms: i64) -> Self {
        Self {
            ms: Some(ms),
            ..Self::default()
        }
    }

    /// Options for a run-at task.
    pub fn run_at(at: DateTime<Utc>) -> Self {
        Self {
            run_at: Some(at),
            ..Self::default()
        }
    }

    /// Returns a copy with the given priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Returns a copy with the given timezone.
    pub fn with_time_zone(mut self, zone: impl Into<String>) -> Self {
        self.time_zone = Some(zone.into());
        self
    }

    /// Priority if set and non-negative.
    pub fn effective_priority(&self) -> Option<i64> {
        self.priority.filter(|p| *p >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_field_names() {
        let opts = ScheduleOptions::cron("*/5 * * * * *")
            .with_time_zone("Europe/Madrid")
            .with_priority(2);
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["cronTime"], "*/5 * * * * *");
        assert_eq!(json["timeZone"], "Europe/Madrid");
        assert_eq!(json["priority"], 2);
        assert!(json.get("ms").is_none());
    }

    #[test]
    fn test_parse_run_at() {
        let opts: ScheduleOptions =
            serde_json::from_str(r#"{"runAt":"2030-01-01T00:00:00Z","timeZone":"UTC"}"#).unwrap();
        assert_eq!(opts.run_at.unwrap().timestamp(), 1_893_456_000);
        assert_eq!(opts.time_zone.as_deref(), Some("UTC"));
    }

    #[test]
    fn test_effective_priority_ignores_negative() {
        assert_eq!(ScheduleOptions::ms(1).with_priority(-1).effective_priority(), None);
        assert_eq!(ScheduleOptions::ms(1).with_priority(0).effective_priority(), Some(0));
    }
}
