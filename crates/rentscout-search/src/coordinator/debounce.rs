use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Resettable delayed task.
///
/// Each [`Debouncer::schedule`] aborts the previous timer and starts a new
/// one. Once a timer fires, its task is detached onto its own tokio task, so a
/// later schedule or cancel only ever aborts a timer that is still waiting.
pub(crate) struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub(crate) async fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        }));
    }

    /// Drops the waiting timer, if any. Returns whether one was still waiting.
    pub(crate) async fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().await;
        match pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counting_task(counter: &Arc<AtomicU32>, value: u32) -> impl Future<Output = ()> + Send {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(value, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_events_runs_only_last_task() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let counter = Arc::new(AtomicU32::new(0));

        debouncer.schedule(counting_task(&counter, 1)).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.schedule(counting_task(&counter, 10)).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.schedule(counting_task(&counter, 100)).await;

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn task_does_not_run_before_delay() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let counter = Arc::new(AtomicU32::new(0));

        debouncer.schedule(counting_task(&counter, 1)).await;
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_waiting_timer() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let counter = Arc::new(AtomicU32::new(0));

        debouncer.schedule(counting_task(&counter, 1)).await;
        assert!(debouncer.cancel().await);
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!debouncer.cancel().await);
    }
}
