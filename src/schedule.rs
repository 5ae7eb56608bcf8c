//! Repeating background tasks owned by a view.
//!
//! A [`ScheduledTask`] is never free-running: whoever spawns it holds it, and
//! tearing the owner down (explicitly via [`ScheduledTask::cancel`] or
//! implicitly on drop) stops it through its cancellation token.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A periodic callback running on the tokio runtime.
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Spawn `tick` every `period`. The first call happens one period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => tick(),
                }
            }

            debug!(task = name, "Scheduled task stopped");
        });

        debug!(task = name, period_ms = period.as_millis() as u64, "Scheduled task started");

        Self {
            name,
            token,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop the task and wait until its loop has exited.
    ///
    /// No tick runs after this returns.
    pub async fn cancel(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!(task = self.name, error = %e, "Scheduled task ended abnormally");
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
