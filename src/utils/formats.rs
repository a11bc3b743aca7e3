use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use crate::utils::ValidationError;

/// Extensions accepted as transcode inputs, compared case-insensitively.
pub const INPUT_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

/// Target format of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    #[serde(alias = "jpeg")]
    Jpg,
    Webp,
}

impl OutputFormat {
    /// Extension written for outputs of this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Webp => "webp",
        }
    }

    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpg | Self::Webp)
    }

    /// Encoder flag pinning near-maximum quality. Lossless PNG gets none.
    pub fn quality_args(&self) -> &'static [&'static str] {
        match self {
            // mjpeg qscale runs 2 (best) .. 31
            Self::Jpg => &["-q:v", "2"],
            Self::Webp => &["-quality", "95"],
            Self::Png => &[],
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "webp" => Ok(Self::Webp),
            other => Err(ValidationError::settings(format!(
                "Unsupported output format: {other}"
            ))),
        }
    }
}

/// Check whether a path carries one of the recognized input extensions
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| INPUT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
