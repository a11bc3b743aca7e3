//! Runs one resolved task: scan, transcode under the pool, aggregate.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use serde::Serialize;
use tracing::debug;

use crate::core::{EventLog, FileJob, FileStatus, ProgressCounters, TaskConfig};
use crate::processing::exec::ProcessRunner;
use crate::processing::ffmpeg::{TranscodeCommand, filter_expression};
use crate::utils::{
    BatchError, BatchResult, OutputFormat, ensure_input_dir, ensure_output_dir,
    list_input_images, validate_task_config,
};
use crate::worker::WorkerPool;

/// Per-file statuses of one finished task run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub name: String,
    pub jobs: Vec<FileJob>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl TaskOutcome {
    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(FileStatus::Done)
    }

    pub fn failed(&self) -> usize {
        self.count(FileStatus::Error)
    }

    fn count(&self, status: FileStatus) -> usize {
        self.jobs.iter().filter(|j| j.status == status).count()
    }
}

/// Shared by every in-flight job of one task run.
struct JobContext {
    task: String,
    runner: Arc<dyn ProcessRunner>,
    transcoder: OsString,
    filter: String,
    format: OutputFormat,
    events: EventLog,
    progress: ProgressCounters,
    board: Mutex<Vec<FileJob>>,
}

impl JobContext {
    fn set_status(&self, index: usize, status: FileStatus) {
        let mut board = self.board.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(job) = board.get_mut(index) {
            job.advance(status);
        }
    }

    async fn process(&self, index: usize, source: PathBuf, target: PathBuf) {
        self.set_status(index, FileStatus::Processing);

        let command = TranscodeCommand::new(self.transcoder.clone())
            .input(&source)
            .output(&target)
            .filter(self.filter.as_str())
            .format(self.format)
            .build();

        let file = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let status = match self.runner.run(&command).await {
            Ok(output) if output.success() => {
                let written = target
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.events.success(format!("[{}] {file} -> {written}", self.task));
                FileStatus::Done
            }
            Ok(output) => {
                let code = output
                    .code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                self.events.error(format!(
                    "[{}] {file} failed (exit {code}): {}",
                    self.task,
                    output.stderr.trim()
                ));
                FileStatus::Error
            }
            Err(e) => {
                self.events.error(format!(
                    "[{}] {file} failed: could not run transcoder: {e}",
                    self.task
                ));
                FileStatus::Error
            }
        };

        self.set_status(index, status);
        let current = self.progress.complete_one();
        debug!("Progress {}/{} after {}", current, self.progress.snapshot().total, file);
    }
}

/// Executes a [`TaskConfig`] against an external transcoder.
#[derive(Clone)]
pub struct TaskRunner {
    runner: Arc<dyn ProcessRunner>,
    transcoder: OsString,
    pool: WorkerPool,
    events: EventLog,
    progress: ProgressCounters,
}

impl TaskRunner {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        transcoder: impl Into<OsString>,
        pool: WorkerPool,
        events: EventLog,
        progress: ProgressCounters,
    ) -> Self {
        Self {
            runner,
            transcoder: transcoder.into(),
            pool,
            events,
            progress,
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Runs every eligible file of `config` and returns once all of them
    /// reached a terminal status. Task-level failures are logged here and
    /// returned; file-level failures only show up in the outcome.
    pub async fn run(&self, name: &str, config: &TaskConfig) -> BatchResult<TaskOutcome> {
        let started = Instant::now();

        let sources = match self.prepare(config).await {
            Ok(sources) => sources,
            Err(e) => {
                self.events.error(format!("[{name}] {e}"));
                return Err(e);
            }
        };

        let mut jobs: Vec<FileJob> = sources
            .into_iter()
            .map(|source| {
                let target = config.target_for(&source);
                FileJob::new(source, target)
            })
            .collect();

        self.progress.add_total(jobs.len());
        self.events.info(format!(
            "[{name}] Processing {} images from {} ({} workers)",
            jobs.len(),
            config.input_dir.display(),
            self.pool.worker_count()
        ));

        self.reject_shared_targets(name, &mut jobs);

        let queued: Vec<(usize, PathBuf, PathBuf)> = jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| !job.status.is_terminal())
            .map(|(i, job)| (i, job.source.clone(), job.target.clone()))
            .collect();

        let context = Arc::new(JobContext {
            task: name.to_string(),
            runner: Arc::clone(&self.runner),
            transcoder: self.transcoder.clone(),
            filter: filter_expression(&config.resize),
            format: config.format,
            events: self.events.clone(),
            progress: self.progress.clone(),
            board: Mutex::new(jobs),
        });

        let worker_context = Arc::clone(&context);
        self.pool
            .run_all(queued, move |(index, source, target)| {
                let context = Arc::clone(&worker_context);
                async move { context.process(index, source, target).await }
            })
            .await;

        let mut jobs = context
            .board
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();

        // A job that never reported back (aborted worker) still has to end.
        for job in jobs.iter_mut().filter(|j| !j.status.is_terminal()) {
            job.advance(FileStatus::Error);
            self.progress.complete_one();
            self.events.error(format!("[{name}] {} was not processed", job.file_name()));
        }

        let outcome = TaskOutcome {
            name: name.to_string(),
            jobs,
            elapsed: started.elapsed(),
        };

        self.events.info(format!(
            "[{name}] Finished: {} done, {} failed in {:.1}s",
            outcome.succeeded(),
            outcome.failed(),
            outcome.elapsed.as_secs_f64()
        ));

        Ok(outcome)
    }

    /// Inputs differing only in extension map to the same output file. The
    /// first in scan order keeps it; the rest end as errors without a run.
    fn reject_shared_targets(&self, name: &str, jobs: &mut [FileJob]) {
        let mut owners: HashMap<PathBuf, String> = HashMap::new();
        for job in jobs.iter_mut() {
            match owners.get(&job.target) {
                Some(owner) => {
                    job.advance(FileStatus::Error);
                    self.progress.complete_one();
                    self.events.error(format!(
                        "[{name}] {} skipped: {} is already written from {owner}",
                        job.file_name(),
                        job.target.display()
                    ));
                }
                None => {
                    owners.insert(job.target.clone(), job.file_name());
                }
            }
        }
    }

    /// Validation, directory checks and the scan. No file is touched yet.
    async fn prepare(&self, config: &TaskConfig) -> BatchResult<Vec<PathBuf>> {
        validate_task_config(config)?;
        ensure_input_dir(&config.input_dir).await?;
        ensure_output_dir(&config.output_dir).await?;

        let sources = list_input_images(&config.input_dir).await?;
        if sources.is_empty() {
            return Err(BatchError::NoFiles(config.input_dir.clone()));
        }
        Ok(sources)
    }
}
