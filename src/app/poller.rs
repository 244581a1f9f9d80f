use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::Error;
use crate::provider::{MetricsProvider, ProviderError};
use crate::view::Screen;

use super::{SharedDashboard, lock};

/// Refresh the dashboard every `interval`. The first tick is skipped since
/// the initial batch is already on screen. A slow fetch delays the next
/// tick instead of stacking polls.
pub fn spawn_poller<S: Screen + Send + 'static>(
    handle: &Handle,
    provider: Arc<dyn MetricsProvider>,
    shared: SharedDashboard<S>,
    interval: Duration,
) -> JoinHandle<()> {
    handle.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = poll_once(&provider, &shared).await {
                warn!(error = %e, "refresh failed");
            }
        }
    })
}

/// Fetch one batch off the async workers, then swap it in and redraw under
/// the lock. On failure the previous batch stays untouched.
pub async fn poll_once<S: Screen>(
    provider: &Arc<dyn MetricsProvider>,
    shared: &SharedDashboard<S>,
) -> Result<usize, Error> {
    let fetch = Arc::clone(provider);
    let batch = tokio::task::spawn_blocking(move || fetch.fetch_batch())
        .await
        .map_err(|e| Error::Poll(ProviderError::Task(e.to_string())))?
        .map_err(Error::Poll)?;
    let count = batch.len();

    let mut dashboard = lock(shared);
    dashboard.apply_batch(batch, Local::now());
    dashboard.render()?;
    debug!(records = count, "batch refreshed");
    Ok(count)
}
