use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

/// Completion barrier for one breadth-first layer.
///
/// Releases waiters once exactly `parties` arrivals have been signalled.
/// Every URL in the layer owes exactly one arrival, whether its work ends at
/// host resolution, at the download attempt, or after chained extraction.
pub struct LayerBarrier {
    pending: AtomicUsize,
    done: watch::Sender<bool>,
}

impl LayerBarrier {
    pub fn new(parties: usize) -> Self {
        let (done, _) = watch::channel(parties == 0);
        Self {
            pending: AtomicUsize::new(parties),
            done,
        }
    }

    /// Signals that one party finished all of its work.
    pub fn arrive(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.done.send_replace(true);
        }
    }

    /// Waits until every party has arrived.
    pub async fn wait(&self) {
        let mut done = self.done.subscribe();
        // wait_for inspects the current value before parking.
        let _ = done.wait_for(|released| *released).await;
    }
}
