//! Persistent application settings.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::ManualSettings;
use crate::utils::ConfigError;
use crate::worker::DEFAULT_WORKERS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Baseline for manual runs and for every profile
    pub manual: ManualSettings,
    pub ffmpeg_path: String,
    pub git_path: String,
    /// Program and leading arguments of the smart-crop tool
    pub smart_crop_command: Vec<String>,
    pub concurrency: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            manual: ManualSettings::default(),
            ffmpeg_path: "ffmpeg".to_string(),
            git_path: "git".to_string(),
            smart_crop_command: vec!["python".to_string(), "smart_crop.py".to_string()],
            concurrency: DEFAULT_WORKERS,
        }
    }
}

impl AppSettings {
    /// `<config dir>/image-batch/settings.json`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("image-batch").join("settings.json"))
    }

    /// Reads `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResizeMethod;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.concurrency, 4);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"ffmpeg_path": "/opt/ffmpeg/bin/ffmpeg", "manual": {"resize": {"method": "ratio"}}}"#,
        )
        .unwrap();

        let settings = AppSettings::load(&path).unwrap();

        assert_eq!(settings.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(settings.git_path, "git");
        assert_eq!(settings.manual.resize.method, ResizeMethod::Ratio);
        assert_eq!(settings.manual.resize.width, 1024);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "concurrency = 4").unwrap();
        assert!(matches!(AppSettings::load(&path), Err(ConfigError::Parse(_))));
    }
}
