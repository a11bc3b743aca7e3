use serde::Serialize;
use tracing::{info, warn};

use crate::core::{BatchTask, EventLog, ProgressCounters};
use crate::processing::runner::{TaskOutcome, TaskRunner};
use crate::vcs::{GitSync, SyncReport};

/// Result of one task inside a batch.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub name: String,
    /// Set when the task ran, even if some files failed
    pub outcome: Option<TaskOutcome>,
    /// Task-level failure (missing input, no eligible files, bad settings)
    pub error: Option<String>,
    pub git: Vec<SyncReport>,
}

impl TaskReport {
    pub fn files_failed(&self) -> usize {
        self.outcome.as_ref().map_or(0, TaskOutcome::failed)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub tasks: Vec<TaskReport>,
}

impl BatchReport {
    pub fn files_done(&self) -> usize {
        self.tasks
            .iter()
            .filter_map(|t| t.outcome.as_ref())
            .map(TaskOutcome::succeeded)
            .sum()
    }

    pub fn files_failed(&self) -> usize {
        self.tasks.iter().map(TaskReport::files_failed).sum()
    }

    /// Tasks that never got to process a file
    pub fn failed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.error.is_some()).count()
    }
}

/// Runs confirmed tasks one after another, syncing git after each.
#[derive(Clone)]
pub struct BatchProcessor {
    runner: TaskRunner,
    sync: GitSync,
    events: EventLog,
    progress: ProgressCounters,
}

impl BatchProcessor {
    pub fn new(
        runner: TaskRunner,
        sync: GitSync,
        events: EventLog,
        progress: ProgressCounters,
    ) -> Self {
        Self { runner, sync, events, progress }
    }

    /// Processes `tasks` strictly in order. Task N+1 starts only after task
    /// N and its git sync are finished; a failing task never stops the batch.
    pub async fn process_batch(&self, tasks: Vec<BatchTask>) -> BatchReport {
        let total = tasks.len();
        self.progress.reset();
        self.events.info(format!("Starting batch of {total} tasks"));

        let mut report = BatchReport::default();
        for (index, task) in tasks.into_iter().enumerate() {
            self.events
                .info(format!("Task {}/{}: {}", index + 1, total, task.name));

            let task_report = match self.runner.run(&task.name, &task.config).await {
                Ok(outcome) => {
                    let git = self.sync.sync_task(&task).await;
                    TaskReport {
                        name: task.name,
                        outcome: Some(outcome),
                        error: None,
                        git,
                    }
                }
                Err(e) => {
                    warn!("Task {} did not run: {}", task.name, e);
                    TaskReport {
                        name: task.name,
                        outcome: None,
                        error: Some(e.to_string()),
                        git: Vec::new(),
                    }
                }
            };
            report.tasks.push(task_report);
        }

        let failed = report.files_failed();
        let message = format!(
            "Batch finished: {} tasks, {} files done, {} files failed, {} tasks skipped",
            total,
            report.files_done(),
            failed,
            report.failed_tasks()
        );
        if failed == 0 && report.failed_tasks() == 0 {
            self.events.success(message);
        } else {
            info!("Batch finished with failures");
            self.events.info(message);
        }

        report
    }
}
