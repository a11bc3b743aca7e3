//! Application state shared by every command.

use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::core::{
    AppSettings, BatchTask, EventLog, ManualSettings, NamedProfile, ProfileStore,
    ProgressCounters, ReviewQueue, SyncRole, TaskBuilder,
};
use crate::processing::{
    BatchProcessor, BatchReport, ProcessRunner, SmartCrop, SmartCropRequest, SmartCropSummary,
    TaskOutcome, TaskRunner,
};
use crate::utils::{BatchResult, ConfigError, ReviewError};
use crate::vcs::{GitCli, GitSync};
use crate::worker::WorkerPool;

/// Owns the profile store, the review queue and the shared sinks, and wires
/// them to the external tools named in [`AppSettings`].
pub struct AppState {
    settings: AppSettings,
    runner: Arc<dyn ProcessRunner>,
    git: GitCli,
    events: EventLog,
    progress: ProgressCounters,
    profiles: ProfileStore,
    review: ReviewQueue,
}

impl AppState {
    pub fn new(settings: AppSettings, runner: Arc<dyn ProcessRunner>) -> Self {
        let git = GitCli::new(Arc::clone(&runner), settings.git_path.as_str());
        debug!(
            "State ready (ffmpeg: {}, git: {}, workers: {})",
            settings.ffmpeg_path, settings.git_path, settings.concurrency
        );
        Self {
            settings,
            runner,
            git,
            events: EventLog::new(),
            progress: ProgressCounters::new(),
            profiles: ProfileStore::new(),
            review: ReviewQueue::new(),
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn progress(&self) -> &ProgressCounters {
        &self.progress
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn review(&self) -> &ReviewQueue {
        &self.review
    }

    fn task_runner(&self) -> TaskRunner {
        TaskRunner::new(
            Arc::clone(&self.runner),
            self.settings.ffmpeg_path.as_str(),
            WorkerPool::new(Some(self.settings.concurrency)),
            self.events.clone(),
            self.progress.clone(),
        )
    }

    fn batch_processor(&self) -> BatchProcessor {
        BatchProcessor::new(
            self.task_runner(),
            GitSync::new(self.git.clone(), self.events.clone()),
            self.events.clone(),
            self.progress.clone(),
        )
    }

    /// Loads the profile file. Failures are logged and leave the store empty.
    pub fn load_profiles(&mut self, path: &Path) -> Result<&[NamedProfile], ConfigError> {
        match self.profiles.load(path) {
            Ok(profiles) => {
                self.events
                    .info(format!("Loaded {} profiles from {}", profiles.len(), path.display()));
                Ok(self.profiles.profiles())
            }
            Err(e) => {
                self.events.error(e.to_string());
                Err(e)
            }
        }
    }

    /// Ad-hoc run of the given manual settings.
    pub async fn run_manual(&self, settings: &ManualSettings) -> BatchResult<TaskOutcome> {
        self.progress.reset();
        let config = TaskBuilder::build_manual(settings);
        self.task_runner().run("manual", &config).await
    }

    /// Builds the review batch from the loaded profiles and the manual defaults.
    pub async fn build_batch(&mut self) -> Result<&[BatchTask], ReviewError> {
        let builder = TaskBuilder::new(&self.git, &self.events);
        self.review
            .build(&builder, &self.profiles, &self.settings.manual)
            .await
    }

    pub fn toggle_git_sync(
        &mut self,
        index: usize,
        role: SyncRole,
        enabled: bool,
    ) -> Result<(), ReviewError> {
        self.review.toggle_git_sync(index, role, enabled)
    }

    pub fn cancel_batch(&mut self) -> Result<(), ReviewError> {
        self.review.cancel()?;
        self.events.info("Batch cancelled");
        Ok(())
    }

    pub async fn confirm_batch(&mut self) -> Result<BatchReport, ReviewError> {
        let processor = self.batch_processor();
        self.review.confirm(&processor).await
    }

    pub async fn smart_crop(&self, request: &SmartCropRequest) -> BatchResult<SmartCropSummary> {
        SmartCrop::new(
            Arc::clone(&self.runner),
            self.settings.smart_crop_command.clone(),
            self.events.clone(),
        )
        .run(request)
        .await
    }
}
