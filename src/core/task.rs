//! Turning profiles and manual settings into resolved tasks.

use std::path::Path;
use tracing::debug;

use crate::core::{
    BatchTask, EventLog, ManualSettings, NamedProfile, Profile, ResizeSettings, TaskConfig,
};
use crate::utils::paths;
use crate::vcs::RepositoryDetector;

/// Builds [`TaskConfig`]s for manual runs and [`BatchTask`]s for batches.
pub struct TaskBuilder<'a> {
    detector: &'a dyn RepositoryDetector,
    events: &'a EventLog,
}

impl<'a> TaskBuilder<'a> {
    pub fn new(detector: &'a dyn RepositoryDetector, events: &'a EventLog) -> Self {
        Self { detector, events }
    }

    /// Copy of the live manual settings, for an ad-hoc single run.
    pub fn build_manual(current: &ManualSettings) -> TaskConfig {
        TaskConfig {
            input_dir: current.input_folder.clone(),
            output_dir: current.output_folder.clone(),
            format: current.format,
            resize: current.resize.clone(),
        }
    }

    /// Layers every field `profile` supplies over `defaults`. Fields the
    /// profile leaves out keep the default value.
    pub fn apply_profile(profile: &Profile, defaults: &ManualSettings) -> ManualSettings {
        let base = &defaults.resize;
        ManualSettings {
            input_folder: profile
                .input_folder
                .clone()
                .unwrap_or_else(|| defaults.input_folder.clone()),
            output_folder: profile
                .output_folder
                .clone()
                .unwrap_or_else(|| defaults.output_folder.clone()),
            format: profile.format.unwrap_or(defaults.format),
            resize: ResizeSettings {
                method: profile.resize_method.unwrap_or(base.method),
                width: profile.width.unwrap_or(base.width),
                height: profile.height.unwrap_or(base.height),
                scale_factor: profile.scale_factor.unwrap_or(base.scale_factor),
                fixed_mode: profile.fixed_mode.unwrap_or(base.fixed_mode),
            },
        }
    }

    /// One task per enabled profile, in profile order. Folders are resolved
    /// against `config_dir` and probed for a repository; sync toggles
    /// always start off.
    pub async fn build_batch(
        &self,
        profiles: &[NamedProfile],
        defaults: &ManualSettings,
        config_dir: &Path,
    ) -> Vec<BatchTask> {
        let mut tasks = Vec::new();

        for entry in profiles {
            if !entry.profile.enabled {
                debug!("Skipping disabled profile {}", entry.name);
                continue;
            }

            let merged = Self::apply_profile(&entry.profile, defaults);
            let mut config = Self::build_manual(&merged);
            config.input_dir = paths::resolve(config_dir, &config.input_dir);
            config.output_dir = paths::resolve(config_dir, &config.output_dir);

            let input_is_repo = self.detector.is_repository(&config.input_dir).await;
            let output_is_repo = self.detector.is_repository(&config.output_dir).await;

            tasks.push(BatchTask {
                name: entry.name.clone(),
                description: entry.profile.description.clone(),
                config,
                input_is_repo,
                output_is_repo,
                sync_input: false,
                sync_output: false,
            });
        }

        if tasks.is_empty() {
            self.events.info("No enabled profiles to build a batch from");
        } else {
            self.events.info(format!("Built batch of {} tasks", tasks.len()));
        }
        tasks
    }
}
