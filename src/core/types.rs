//! Core value types: profiles, resolved task configs and per-file jobs.

use std::fmt;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::utils::OutputFormat;

/// How a task changes image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMethod {
    /// Exact target width × height
    #[default]
    Fixed,
    /// Uniform multiplicative scale
    Ratio,
}

/// How `Fixed` reconciles a differing aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedMode {
    /// Cover the box, then center-crop the overflow
    #[default]
    Crop,
    /// Fit inside the box, then center-pad transparently
    Pad,
}

/// Resize parameters. Only the fields relevant to `method` are read, the
/// others are carried so that sparse profile overrides can swap methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeSettings {
    pub method: ResizeMethod,
    /// Target width in pixels (fixed mode)
    pub width: u32,
    /// Target height in pixels (fixed mode)
    pub height: u32,
    /// Multiplier applied to both sides (ratio mode)
    pub scale_factor: f64,
    pub fixed_mode: FixedMode,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            method: ResizeMethod::Fixed,
            width: 1024,
            height: 1024,
            scale_factor: 0.5,
            fixed_mode: FixedMode::Crop,
        }
    }
}

/// Live settings of an ad-hoc run. Also the baseline every profile is
/// layered on when a batch is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualSettings {
    pub input_folder: PathBuf,
    pub output_folder: PathBuf,
    pub format: OutputFormat,
    pub resize: ResizeSettings,
}

/// One named entry of the profile file.
///
/// Every optional field left out means "inherit the manual default".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "enable", default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_folder: Option<PathBuf>,
    #[serde(default)]
    pub output_folder: Option<PathBuf>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub resize_method: Option<ResizeMethod>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub scale_factor: Option<f64>,
    #[serde(default)]
    pub fixed_mode: Option<FixedMode>,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            enabled: true,
            description: String::new(),
            input_folder: None,
            output_folder: None,
            format: None,
            resize_method: None,
            width: None,
            height: None,
            scale_factor: None,
            fixed_mode: None,
        }
    }
}

/// Fully resolved execution unit. Built once, never edited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub resize: ResizeSettings,
}

impl TaskConfig {
    /// Output path for `source`: same stem, extension of the target format.
    pub fn target_for(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "output".into());
        let mut name = stem;
        name.push(".");
        name.push(self.format.extension());
        self.output_dir.join(name)
    }
}

/// Which side of a task a git sync applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncRole {
    Input,
    Output,
}

impl fmt::Display for SyncRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// A resolved profile awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchTask {
    pub name: String,
    pub config: TaskConfig,
    pub description: String,
    /// Detected at build time; advisory only
    pub input_is_repo: bool,
    pub output_is_repo: bool,
    /// User toggles, opt-in
    pub sync_input: bool,
    pub sync_output: bool,
}

impl BatchTask {
    pub fn is_repo(&self, role: SyncRole) -> bool {
        match role {
            SyncRole::Input => self.input_is_repo,
            SyncRole::Output => self.output_is_repo,
        }
    }

    pub fn sync_enabled(&self, role: SyncRole) -> bool {
        match role {
            SyncRole::Input => self.sync_input,
            SyncRole::Output => self.sync_output,
        }
    }

    pub fn set_sync(&mut self, role: SyncRole, enabled: bool) {
        match role {
            SyncRole::Input => self.sync_input = enabled,
            SyncRole::Output => self.sync_output = enabled,
        }
    }

    pub fn dir(&self, role: SyncRole) -> &Path {
        match role {
            SyncRole::Input => &self.config.input_dir,
            SyncRole::Output => &self.config.output_dir,
        }
    }
}

/// Lifecycle of one file inside a task run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Processing,
    Done,
    Error,
}

impl FileStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Done | Self::Error => 2,
        }
    }
}

/// A single source file and where its output goes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileJob {
    pub source: PathBuf,
    pub target: PathBuf,
    pub status: FileStatus,
}

impl FileJob {
    pub fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target, status: FileStatus::Pending }
    }

    /// Moves the job forward. Returns false, leaving the status untouched,
    /// for any transition that is not strictly forward.
    pub fn advance(&mut self, next: FileStatus) -> bool {
        if self.status.is_terminal() || next.rank() <= self.status.rank() {
            return false;
        }
        self.status = next;
        true
    }

    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
