use crate::state::AppState;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn the background task that drives the answer timer.
///
/// Each tick refreshes the countdown; clients only hear about it when the
/// displayed seconds change or the responder runs out of time.
pub fn spawn_timer_driver(state: Arc<AppState>) -> JoinHandle<()> {
    let period = state.config.tick_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let outcome = state.tick().await;
            if outcome.needs_persist {
                tracing::info!("Answer timer expired");
            }
        }
    })
}
