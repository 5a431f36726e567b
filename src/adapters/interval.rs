use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::Tick;

/// Fires `tick` every `period`, starting one period from now.
pub(super) async fn run(period: Duration, tick: Tick, token: CancellationToken) {
    let period = period.max(Duration::from_millis(1));
    let mut timer = time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = timer.tick() => tick.fire(),
        }
    }
}
