//! # Polling
//!
//! Periodic refresh as a cancellable task. A [`PollHandle`] owns the task: call
//! [`PollHandle::cancel`] to stop it and wait, or drop the handle to stop it in
//! the background. The stop signal is sent at most once and the loop exits on
//! the first signal, so a poller stops exactly once however its owner ends.
//!
//! A run in progress is raced against the stop signal and abandoned when it
//! arrives, so nothing the job would report reaches an owner that is gone.

use crate::api::ApiResult;
use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub struct PollHandle {
    name: &'static str,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops the poller, abandoning any run in progress, and waits for the task.
    pub async fn cancel(mut self) {
        self.signal_stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(poller = self.name, error = %e, "Poller task failed");
            }
        }
    }

    fn signal_stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

/// Runs `job` every `period`, starting one period from now.
///
/// Failures are logged and the next tick runs as usual. Ticks missed while a
/// run is slow are not made up.
pub fn spawn_poller<F, Fut>(name: &'static str, period: Duration, mut job: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ApiResult<()>> + Send + 'static,
{
    let (stop, mut stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(poller = name, period_secs = period.as_secs(), "Poller started");
        loop {
            tokio::select! {
                biased;
                _ = &mut stopped => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                _ = &mut stopped => {
                    debug!(poller = name, "Run abandoned");
                    break;
                }
                result = job() => match result {
                    Ok(()) => debug!(poller = name, "Poll ok"),
                    Err(e) => warn!(poller = name, error = %e, "Poll failed"),
                },
            }
        }
        info!(poller = name, "Poller stopped");
    });
    PollHandle {
        name,
        stop: Some(stop),
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StorefrontError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(runs: Arc<AtomicUsize>, fail: bool) -> PollHandle {
        spawn_poller("test", Duration::from_secs(30), move || {
            let runs = runs.clone();
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                if fail {
                    Err(StorefrontError::Transport("offline".into()))
                } else {
                    Ok(())
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_once_per_period() {
        let runs = Arc::new(AtomicUsize::new(0));
        let handle = counting(runs.clone(), false);

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        handle.cancel().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_do_not_stop_polling() {
        let runs = Arc::new(AtomicUsize::new(0));
        let handle = counting(runs.clone(), true);

        tokio::time::sleep(Duration::from_secs(91)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert!(!handle.is_finished());

        handle.cancel().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_further_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let handle = counting(runs.clone(), false);

        tokio::time::sleep(Duration::from_secs(31)).await;
        handle.cancel().await;

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_the_task() {
        let runs = Arc::new(AtomicUsize::new(0));
        let handle = counting(runs.clone(), false);
        drop(handle);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    // job takes 10s and only counts once it has finished
    fn slow(finished: Arc<AtomicUsize>) -> PollHandle {
        spawn_poller("slow", Duration::from_secs(30), move || {
            let finished = finished.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_mid_run_abandons_the_run() {
        let finished = Arc::new(AtomicUsize::new(0));
        let handle = slow(finished.clone());

        // first run started at 30s and is still sleeping
        tokio::time::sleep(Duration::from_secs(31)).await;
        drop(handle);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_run_returns_without_finishing_it() {
        let finished = Arc::new(AtomicUsize::new(0));
        let handle = slow(finished.clone());

        tokio::time::sleep(Duration::from_secs(31)).await;
        handle.cancel().await;

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
