use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tokio::time;
use tokio_util::sync::CancellationToken;

use super::Tick;
use crate::validate::parse_cron;

/// Fires `tick` on every occurrence of `expr`, evaluated in `zone` (local time if `None`).
pub(super) async fn run(expr: String, zone: Option<Tz>, tick: Tick, token: CancellationToken) {
    let schedule = match parse_cron(&expr) {
        Ok(schedule) => schedule,
        Err(e) => {
            tracing::error!(task = %tick.name(), expr = %expr, error = %e, "cron expression rejected while arming");
            return;
        }
    };

    // Occurrences at or before `last` were already fired.
    let mut last = Utc::now();
    while let Some(next) = next_after(&schedule, zone, Utc::now().max(last)) {
        let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        tokio::select! {
            _ = token.cancelled() => return,
            _ = time::sleep(wait) => tick.fire(),
        }
        last = next;
    }
    tracing::debug!(task = %tick.name(), expr = %expr, "cron schedule has no further occurrences");
}

fn next_after(schedule: &Schedule, zone: Option<Tz>, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match zone {
        Some(tz) => schedule
            .after(&from.with_timezone(&tz))
            .next()
            .map(|at| at.with_timezone(&Utc)),
        None => schedule
            .after(&from.with_timezone(&Local))
            .next()
            .map(|at| at.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_after_every_second() {
        let schedule = parse_cron("* * * * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let next = next_after(&schedule, None, from).unwrap();
        assert_eq!(next, from + chrono::Duration::seconds(1));
    }

    #[test]
    fn test_next_after_honours_zone() {
        // 09:00 every day in Tokyo is 00:00 UTC.
        let schedule = parse_cron("0 9 * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let next = next_after(&schedule, Some(chrono_tz::Asia::Tokyo), from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_next_after_is_strictly_later() {
        let schedule = parse_cron("*/10 * * * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 10).unwrap();
        let next = next_after(&schedule, Some(chrono_tz::UTC), from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 20).unwrap());
    }
}
