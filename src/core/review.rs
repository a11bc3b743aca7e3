//! Review gate between building a batch and running it.

use std::path::Path;
use serde::Serialize;
use tracing::debug;

use crate::core::{BatchTask, ManualSettings, ProfileStore, SyncRole, TaskBuilder};
use crate::processing::{BatchProcessor, BatchReport};
use crate::utils::ReviewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewState {
    Idle,
    Built,
    Running,
}

impl ReviewState {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Built => "built",
            Self::Running => "running",
        }
    }
}

/// Holds one built batch until it is confirmed or cancelled.
///
/// `Idle -> Built -> Idle` on cancel, `Idle -> Built -> Running -> Idle` on
/// confirm. A confirmed batch runs to the end and is then dropped.
#[derive(Debug)]
pub struct ReviewQueue {
    state: ReviewState,
    tasks: Vec<BatchTask>,
}

impl Default for ReviewQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewQueue {
    pub fn new() -> Self {
        Self {
            state: ReviewState::Idle,
            tasks: Vec::new(),
        }
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    /// Snapshot of the pending batch for rendering
    pub fn tasks(&self) -> &[BatchTask] {
        &self.tasks
    }

    /// Builds a batch from every enabled profile in `store`. An empty batch
    /// leaves the queue idle.
    pub async fn build(
        &mut self,
        builder: &TaskBuilder<'_>,
        store: &ProfileStore,
        defaults: &ManualSettings,
    ) -> Result<&[BatchTask], ReviewError> {
        if self.state != ReviewState::Idle {
            return Err(ReviewError::invalid("build", self.state.name()));
        }

        let base = store.base_dir().unwrap_or(Path::new("."));
        let tasks = builder.build_batch(store.profiles(), defaults, base).await;
        if tasks.is_empty() {
            return Err(ReviewError::EmptyBatch);
        }

        self.tasks = tasks;
        self.state = ReviewState::Built;
        Ok(&self.tasks)
    }

    /// Discards the built batch without running anything.
    pub fn cancel(&mut self) -> Result<(), ReviewError> {
        if self.state != ReviewState::Built {
            return Err(ReviewError::invalid("cancel", self.state.name()));
        }
        debug!("Discarding {} reviewed tasks", self.tasks.len());
        self.tasks.clear();
        self.state = ReviewState::Idle;
        Ok(())
    }

    pub fn toggle_git_sync(
        &mut self,
        index: usize,
        role: SyncRole,
        enabled: bool,
    ) -> Result<(), ReviewError> {
        if self.state != ReviewState::Built {
            return Err(ReviewError::invalid("toggle git sync", self.state.name()));
        }
        let task = self
            .tasks
            .get_mut(index)
            .ok_or(ReviewError::UnknownTask(index))?;
        task.set_sync(role, enabled);
        Ok(())
    }

    /// Runs every task of the built batch once, in order, then returns to
    /// idle with the batch dropped.
    pub async fn confirm(&mut self, processor: &BatchProcessor) -> Result<BatchReport, ReviewError> {
        if self.state != ReviewState::Built {
            return Err(ReviewError::invalid("confirm", self.state.name()));
        }

        self.state = ReviewState::Running;
        let tasks = std::mem::take(&mut self.tasks);
        let report = processor.process_batch(tasks).await;
        self.state = ReviewState::Idle;
        Ok(report)
    }
}
