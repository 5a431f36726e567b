//! # Descriptor validation and defaulting.
//!
//! Two pure steps run before a task enters the store:
//!
//! ```text
//! validate_task(kind, name, options, existing)   first failure wins:
//!   1. name not already registered
//!   2. non-negative priority not already taken
//!   3. kind-specific:
//!        Cron      cronTime present and parseable, timeZone known
//!        Interval  ms present and >= 0
//!        Delay     ms present and >= 0
//!        RunAt     runAt present and not in the past, timeZone known
//!
//! fill_defaults(task)
//!   - negative priority  → None
//!   - RunAt              → ms = max(runAt - now, 0)
//! ```
//!
//! Cron expressions may have five fields (minute-first, as in crontab) or
//! six/seven fields (second-first); five-field ones run at second 0.
//! Five-field weekdays use crontab numbering (0 and 7 are Sunday, 1 is Monday)
//! and are renumbered for the `cron` crate (1 is Sunday).

use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;
use crate::tasks::{ExecutionType, ScheduleOptions, ScheduleTask};

/// Validates a candidate task against its kind rules and the registered tasks.
///
/// `existing` yields `(name, options)` for every registered task.
pub fn validate_task<'a, I>(
    kind: ExecutionType,
    name: &str,
    options: &ScheduleOptions,
    existing: I,
) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = (&'a str, &'a ScheduleOptions)>,
{
    validate_task_at(kind, name, options, existing, Utc::now())
}

/// Same as [`validate_task`] with an explicit "now".
pub fn validate_task_at<'a, I>(
    kind: ExecutionType,
    name: &str,
    options: &ScheduleOptions,
    existing: I,
    now: DateTime<Utc>,
) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = (&'a str, &'a ScheduleOptions)>,
{
    let priority = options.effective_priority();
    let mut priority_taken = false;

    for (other, other_opts) in existing {
        if other == name {
            return Err(ValidationError::DuplicateName {
                name: name.to_string(),
            });
        }
        if priority.is_some() && other_opts.priority == priority {
            priority_taken = true;
        }
    }

    if let Some(priority) = priority.filter(|_| priority_taken) {
        return Err(ValidationError::DuplicatePriority {
            name: name.to_string(),
            priority,
        });
    }

    match kind {
        ExecutionType::Cron => {
            let expr = match options.cron_time.as_deref().map(str::trim) {
                Some(expr) if !expr.is_empty() => expr,
                _ => return Err(ValidationError::MissingCronTime),
            };
            parse_cron(expr).map_err(|e| ValidationError::InvalidCronTime {
                expr: expr.to_string(),
                reason: e.to_string(),
            })?;
            check_time_zone(kind, options)?;
        }
        ExecutionType::Interval | ExecutionType::Delay => {
            if !matches!(options.ms, Some(ms) if ms >= 0) {
                return Err(ValidationError::InvalidMs { kind });
            }
        }
        ExecutionType::RunAt => {
            let run_at = options.run_at.ok_or(ValidationError::MissingRunAt)?;
            if run_at < now {
                return Err(ValidationError::PastRunAt { run_at });
            }
            check_time_zone(kind, options)?;
        }
    }

    Ok(())
}

/// Normalizes a validated descriptor in place.
pub fn fill_defaults(task: &mut ScheduleTask) {
    fill_defaults_at(task, Utc::now());
}

/// Same as [`fill_defaults`] with an explicit "now".
pub fn fill_defaults_at(task: &mut ScheduleTask, now: DateTime<Utc>) {
    let kind = task.kind();
    let opts = task.options_mut();

    if matches!(opts.priority, Some(p) if p < 0) {
        opts.priority = None;
    }

    if kind == ExecutionType::RunAt {
        if let Some(run_at) = opts.run_at {
            let zone = opts.time_zone.as_deref().and_then(parse_time_zone);
            opts.ms = Some(run_at_delay_ms(run_at, zone, now));
        }
    }
}

/// Milliseconds from `now` until `run_at`, measured in `zone` (local time if `None`), clamped at 0.
pub(crate) fn run_at_delay_ms(run_at: DateTime<Utc>, zone: Option<Tz>, now: DateTime<Utc>) -> i64 {
    let delta = match zone {
        Some(tz) => run_at
            .with_timezone(&tz)
            .signed_duration_since(now.with_timezone(&tz)),
        None => run_at
            .with_timezone(&Local)
            .signed_duration_since(now.with_timezone(&Local)),
    };
    delta.num_milliseconds().max(0)
}

/// Parses a cron expression, accepting the five-field crontab form.
pub(crate) fn parse_cron(expr: &str) -> Result<cron::Schedule, cron::error::Error> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.as_slice() {
        [minute, hour, dom, month, dow] => {
            let dow = crontab_weekdays(dow);
            cron::Schedule::from_str(&format!("0 {minute} {hour} {dom} {month} {dow}"))
        }
        _ => cron::Schedule::from_str(expr.trim()),
    }
}

/// Renumbers a crontab day-of-week field (0..=7, Sunday = 0 = 7) to the
/// `cron` crate's 1..=7 (Sunday = 1).
///
/// Numeric items (`n`, `a-b`, `*/s`, `a-b/s`, `n/s`) are expanded into an
/// explicit list; items with names or out-of-range numbers pass through and are
/// left for the parser to accept or reject.
fn crontab_weekdays(field: &str) -> String {
    field
        .split(',')
        .map(|item| match crontab_weekday_values(item) {
            Some(days) => days
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(","),
            None => item.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn crontab_weekday_values(item: &str) -> Option<Vec<u8>> {
    let (base, step) = match item.split_once('/') {
        Some((base, step)) => (base, Some(step.parse::<u8>().ok().filter(|s| *s > 0)?)),
        None => (item, None),
    };

    let (from, to) = match base {
        // plain `*` and `?` mean every day under both numberings
        "*" | "?" if step.is_none() => return None,
        "*" => (0, 6),
        _ => match base.split_once('-') {
            Some((a, b)) => (a.parse::<u8>().ok()?, b.parse::<u8>().ok()?),
            None => {
                let n = base.parse::<u8>().ok()?;
                (n, if step.is_some() { 7 } else { n })
            }
        },
    };
    if from > to || to > 7 {
        return None;
    }

    let mut days: Vec<u8> = (from..=to)
        .step_by(usize::from(step.unwrap_or(1)))
        .map(|day| day % 7 + 1)
        .collect();
    days.sort_unstable();
    days.dedup();
    Some(days)
}

/// Looks up an IANA zone identifier.
pub(crate) fn parse_time_zone(zone: &str) -> Option<Tz> {
    zone.parse::<Tz>().ok()
}

fn check_time_zone(kind: ExecutionType, options: &ScheduleOptions) -> Result<(), ValidationError> {
    match options.time_zone.as_deref() {
        Some(zone) if parse_time_zone(zone).is_none() => Err(ValidationError::InvalidTimeZone {
            kind,
            zone: zone.to_string(),
        }),
        _ => Ok(()),
    }
}
