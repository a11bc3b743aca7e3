use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use serde::Serialize;

/// Snapshot of the shared counters for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Number of files that reached a terminal status
    pub current: usize,
    /// Number of files discovered so far
    pub total: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: usize,
}

impl Progress {
    pub fn new(current: usize, total: usize) -> Self {
        let progress_percentage = if total > 0 {
            (current * 100) / total
        } else {
            0
        };
        Self { current, total, progress_percentage }
    }
}

/// Shared `{current, total}` counters.
///
/// Worker completions bump `current` concurrently, so both counters are
/// atomics. Reset at the start of a manual run and at the start of a batch,
/// never between the tasks of one batch.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounters {
    current: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.current.store(0, Ordering::SeqCst);
        self.total.store(0, Ordering::SeqCst);
    }

    /// Grows the total when a task discovers its files
    pub fn add_total(&self, files: usize) {
        self.total.fetch_add(files, Ordering::SeqCst);
    }

    /// Records one finished file and returns the new `current`
    pub fn complete_one(&self) -> usize {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn snapshot(&self) -> Progress {
        Progress::new(
            self.current.load(Ordering::SeqCst),
            self.total.load(Ordering::SeqCst),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_handles_empty_total() {
        assert_eq!(Progress::new(0, 0).progress_percentage, 0);
        assert_eq!(Progress::new(1, 4).progress_percentage, 25);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_completions_are_all_counted() {
        let counters = ProgressCounters::new();
        counters.add_total(200);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let counters = counters.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    counters.complete_one();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counters.snapshot(), Progress::new(200, 200));
        counters.reset();
        assert_eq!(counters.snapshot(), Progress::new(0, 0));
    }
}
