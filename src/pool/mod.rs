use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use log::{debug, warn};
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;

/// Unit of work accepted by a [`WorkerPool`].
pub type Job = BoxFuture<'static, ()>;

/// Fixed-size pool of execution slots.
///
/// Jobs are spawned onto the runtime immediately but only `size` of them
/// hold a slot and make progress at any moment; the rest wait on the slot
/// semaphore in submission order.
pub struct WorkerPool {
    name: &'static str,
    slots: Arc<Semaphore>,
    tasks: Mutex<JoinSet<()>>,
    closed: AtomicBool,
}

impl WorkerPool {
    pub fn new(name: &'static str, size: usize) -> Self {
        Self {
            name,
            slots: Arc::new(Semaphore::new(size.max(1))),
            tasks: Mutex::new(JoinSet::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Schedules `job` on this pool. Jobs submitted after shutdown are
    /// dropped.
    pub fn submit(&self, job: Job) {
        if self.closed.load(Ordering::Acquire) {
            warn!("{} pool is shut down, dropping job", self.name);
            return;
        }
        let slots = Arc::clone(&self.slots);
        let mut tasks = self.tasks.lock();
        // Reap finished handles so the set only tracks live jobs.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            let Ok(_slot) = slots.acquire_owned().await else {
                return;
            };
            job.await;
        });
    }

    /// Stops accepting work, waits up to `grace` for submitted jobs to
    /// finish, then aborts whatever is left.
    pub async fn shutdown(&self, grace: Duration) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut tasks = std::mem::take(&mut *self.tasks.lock());
        let drained = timeout(grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(
                "{} pool did not drain within {:?}, aborting {} jobs",
                self.name,
                grace,
                tasks.len()
            );
            tasks.shutdown().await;
        }
        self.slots.close();
        debug!("{} pool shut down", self.name);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use tokio::time::sleep;

    use super::*;

    #[tokio::test]
    async fn runs_at_most_size_jobs_concurrently() {
        let pool = WorkerPool::new("test", 2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        for _ in 0..6 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            let finished = Arc::clone(&finished);
            pool.submit(Box::pin(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(20)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                finished.fetch_add(1, Ordering::SeqCst);
            }));
        }

        pool.shutdown(Duration::from_secs(5)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 6);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn submissions_after_shutdown_are_dropped() {
        let pool = WorkerPool::new("test", 1);
        pool.shutdown(Duration::from_secs(1)).await;

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        pool.submit(Box::pin(async move {
            flag.store(true, Ordering::SeqCst);
        }));

        sleep(Duration::from_millis(50)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let pool = WorkerPool::new("test", 1);
        pool.shutdown(Duration::from_millis(100)).await;
        pool.shutdown(Duration::from_millis(100)).await;
    }
}
