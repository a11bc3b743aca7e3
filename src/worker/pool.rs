use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

pub const DEFAULT_WORKERS: usize = 4;

/// Sliding-window pool: at most `worker_count` jobs in flight, and a
/// finished job frees its permit for the next queued one right away.
#[derive(Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    worker_count: usize,
    active_workers: Arc<AtomicUsize>,
    peak_workers: Arc<AtomicUsize>,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(None)
    }
}

impl WorkerPool {
    pub fn new(worker_count: Option<usize>) -> Self {
        let worker_count = worker_count.unwrap_or(DEFAULT_WORKERS).max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(worker_count)),
            worker_count,
            active_workers: Arc::new(AtomicUsize::new(0)),
            peak_workers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Runs `work` once per item and returns every output, in completion order.
    ///
    /// A permit is acquired before each dispatch, so the loop itself waits
    /// whenever the window is full. Returns once every dispatched job ended.
    pub async fn run_all<T, O, F, Fut>(&self, items: Vec<T>, work: F) -> Vec<O>
    where
        T: Send + 'static,
        O: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
    {
        let total = items.len();
        let work = Arc::new(work);
        let mut in_flight = JoinSet::new();

        for item in items {
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    warn!("Worker pool closed before all {} jobs were dispatched: {}", total, e);
                    break;
                }
            };

            let work = Arc::clone(&work);
            let active = Arc::clone(&self.active_workers);
            let peak = Arc::clone(&self.peak_workers);

            in_flight.spawn(async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);

                let output = work(item).await;

                // Leave the active count before the permit admits the next job.
                active.fetch_sub(1, Ordering::SeqCst);
                drop(permit);
                output
            });
        }

        let mut outputs = Vec::with_capacity(total);
        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok(output) => outputs.push(output),
                Err(e) => warn!("Worker job aborted: {}", e),
            }
        }

        debug!(
            "Pool drained - {}/{} jobs returned, peak concurrency {}/{}",
            outputs.len(),
            total,
            self.peak_workers(),
            self.worker_count
        );
        outputs
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously running jobs seen so far
    pub fn peak_workers(&self) -> usize {
        self.peak_workers.load(Ordering::SeqCst)
    }
}
