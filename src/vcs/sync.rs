use std::path::Path;
use serde::Serialize;
use tracing::debug;

use crate::core::{BatchTask, EventLog, SyncRole};
use crate::processing::exec::ProcessOutput;
use super::GitCli;

/// The git step a sync stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GitStep {
    Stage,
    Commit,
    Push,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum SyncStatus {
    /// Toggle off, or toggle on for a directory that is not a repository
    Skipped { reason: String },
    /// Changes were committed and pushed
    Pushed,
    /// Nothing was staged; push still ran and succeeded
    UpToDate,
    Failed { step: GitStep, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub role: SyncRole,
    #[serde(flatten)]
    pub status: SyncStatus,
}

/// Commit message used for every sync of `task`'s `role` directory.
pub fn commit_message(task: &str, role: SyncRole) -> String {
    format!("batch: update {role} images for task '{task}'")
}

/// Result of a commit step that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The tree was already clean; not an error
    NothingToCommit,
}

fn nothing_to_commit(output: &ProcessOutput) -> bool {
    let text = output.combined().to_lowercase();
    text.contains("nothing to commit") || text.contains("nothing added to commit")
}

fn failure(output: std::io::Result<ProcessOutput>) -> String {
    match output {
        Ok(output) => {
            let text = output.combined();
            if text.is_empty() {
                format!("exit code {:?}", output.code)
            } else {
                text
            }
        }
        Err(e) => e.to_string(),
    }
}

/// Stage, commit and push the opted-in directories of a finished task.
///
/// Failures are logged and reported, never propagated: a sync problem does
/// not change the task's own result.
#[derive(Clone)]
pub struct GitSync {
    git: GitCli,
    events: EventLog,
}

impl GitSync {
    pub fn new(git: GitCli, events: EventLog) -> Self {
        Self { git, events }
    }

    /// Input first, then output. Roles with the toggle off spawn nothing.
    pub async fn sync_task(&self, task: &BatchTask) -> Vec<SyncReport> {
        let mut reports = Vec::with_capacity(2);
        for role in [SyncRole::Input, SyncRole::Output] {
            let status = if !task.sync_enabled(role) {
                debug!("[{}] git sync for {} folder is off", task.name, role);
                SyncStatus::Skipped { reason: "sync disabled".into() }
            } else if !task.is_repo(role) {
                self.events.info(format!(
                    "[{}] Skipping git sync: {} folder is not a repository",
                    task.name, role
                ));
                SyncStatus::Skipped { reason: "not a repository".into() }
            } else {
                self.sync_dir(&task.name, role, task.dir(role)).await
            };
            reports.push(SyncReport { role, status });
        }
        reports
    }

    async fn sync_dir(&self, task: &str, role: SyncRole, dir: &Path) -> SyncStatus {
        match self.git.stage_all(dir).await {
            Ok(output) if output.success() => {}
            other => return self.fail(task, role, GitStep::Stage, failure(other)),
        }

        let committed = match self.git.commit(dir, &commit_message(task, role)).await {
            Ok(output) if output.success() => CommitOutcome::Committed,
            Ok(output) if nothing_to_commit(&output) => CommitOutcome::NothingToCommit,
            other => return self.fail(task, role, GitStep::Commit, failure(other)),
        };

        match committed {
            CommitOutcome::Committed => self
                .events
                .success(format!("[{task}] Committed changes in {role} folder")),
            CommitOutcome::NothingToCommit => self
                .events
                .success(format!("[{task}] Nothing to commit in {role} folder")),
        }

        match self.git.push(dir).await {
            Ok(output) if output.success() => {}
            other => return self.fail(task, role, GitStep::Push, failure(other)),
        }

        self.events.success(format!("[{task}] Pushed {role} folder"));
        match committed {
            CommitOutcome::Committed => SyncStatus::Pushed,
            CommitOutcome::NothingToCommit => SyncStatus::UpToDate,
        }
    }

    fn fail(&self, task: &str, role: SyncRole, step: GitStep, message: String) -> SyncStatus {
        let verb = match step {
            GitStep::Stage => "stage",
            GitStep::Commit => "commit",
            GitStep::Push => "push",
        };
        self.events.error(format!(
            "[{task}] Git {verb} failed for {role} folder: {message}"
        ));
        SyncStatus::Failed { step, message }
    }
}
