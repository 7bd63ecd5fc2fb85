use crate::tracker::Tracker;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Mutex<Tracker>>,
    pub persist_delay: Duration,
}

impl AppState {
    pub fn new(tracker: Tracker, persist_delay: Duration) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
            persist_delay,
        }
    }

    /// Persists deferred write `seq` once the delay has passed, unless a newer
    /// write has replaced it by then.
    pub fn schedule_flush(&self, seq: u64) {
        let tracker = Arc::clone(&self.tracker);
        let delay = self.persist_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = tracker.lock().await.flush_deferred(seq) {
                error!("failed to persist deferred write: {err}");
            }
        });
    }

    pub async fn flush_pending(&self) {
        if let Err(err) = self.tracker.lock().await.flush_pending() {
            error!("failed to persist pending write: {err}");
        }
    }
}
