use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use super::Tick;

/// Fires `tick` once after `wait`, unless cancelled first.
pub(super) async fn run(wait: Duration, tick: Tick, token: CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => {}
        _ = time::sleep(wait) => tick.fire(),
    }
}
