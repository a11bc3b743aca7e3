//! Handlers for single-folder work: manual runs and smart crop.

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;

use crate::core::{AppState, FixedMode, ManualSettings, ResizeMethod};
use crate::processing::SmartCropRequest;
use crate::processing::smart_crop::{DEFAULT_CROP_HEIGHT, DEFAULT_CROP_WIDTH};
use crate::utils::OutputFormat;

fn parse_method(value: &str) -> Result<ResizeMethod, String> {
    match value.to_lowercase().as_str() {
        "fixed" => Ok(ResizeMethod::Fixed),
        "ratio" => Ok(ResizeMethod::Ratio),
        other => Err(format!("unknown resize method '{other}' (fixed, ratio)")),
    }
}

fn parse_fixed_mode(value: &str) -> Result<FixedMode, String> {
    match value.to_lowercase().as_str() {
        "crop" => Ok(FixedMode::Crop),
        "pad" => Ok(FixedMode::Pad),
        other => Err(format!("unknown fixed mode '{other}' (crop, pad)")),
    }
}

/// Overrides for the manual settings stored in the settings file.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Folder with the source images
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Folder the converted images are written to (created if missing)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// png, jpg or webp
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// fixed or ratio
    #[arg(long, value_parser = parse_method)]
    pub method: Option<ResizeMethod>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Scale factor for ratio mode
    #[arg(long)]
    pub scale: Option<f64>,

    /// crop or pad, for fixed mode
    #[arg(long, value_parser = parse_fixed_mode)]
    pub fixed_mode: Option<FixedMode>,
}

impl RunArgs {
    pub fn apply(&self, base: &ManualSettings) -> ManualSettings {
        let mut settings = base.clone();
        if let Some(input) = &self.input {
            settings.input_folder = input.clone();
        }
        if let Some(output) = &self.output {
            settings.output_folder = output.clone();
        }
        if let Some(format) = self.format {
            settings.format = format;
        }
        if let Some(method) = self.method {
            settings.resize.method = method;
        }
        if let Some(width) = self.width {
            settings.resize.width = width;
        }
        if let Some(height) = self.height {
            settings.resize.height = height;
        }
        if let Some(scale) = self.scale {
            settings.resize.scale_factor = scale;
        }
        if let Some(mode) = self.fixed_mode {
            settings.resize.fixed_mode = mode;
        }
        settings
    }
}

pub(super) async fn run(state: &AppState, args: RunArgs) -> Result<()> {
    let settings = args.apply(&state.settings().manual);
    let outcome = state
        .run_manual(&settings)
        .await
        .context("Manual run did not start")?;

    println!(
        "{}: {} done, {} failed, {} total in {:.1}s",
        outcome.name,
        outcome.succeeded(),
        outcome.failed(),
        outcome.total(),
        outcome.elapsed.as_secs_f64()
    );
    Ok(())
}

#[derive(Args, Debug)]
pub struct SmartCropArgs {
    /// Folder with the template images
    #[arg(long)]
    pub templates: PathBuf,

    /// Folder with the images to crop
    #[arg(long)]
    pub input: PathBuf,

    /// Where full-resolution crops go
    #[arg(long)]
    pub output_high: Option<PathBuf>,

    /// Where fixed-size crops go
    #[arg(long)]
    pub output_fixed: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_CROP_WIDTH)]
    pub width: u32,

    #[arg(long, default_value_t = DEFAULT_CROP_HEIGHT)]
    pub height: u32,
}

impl From<SmartCropArgs> for SmartCropRequest {
    fn from(args: SmartCropArgs) -> Self {
        Self {
            templates: args.templates,
            input: args.input,
            output_high: args.output_high,
            output_fixed: args.output_fixed,
            width: args.width,
            height: args.height,
        }
    }
}

pub(super) async fn smart_crop(state: &AppState, args: SmartCropArgs) -> Result<()> {
    let request = SmartCropRequest::from(args);
    let summary = state.smart_crop(&request).await?;
    println!("Smart crop: {} cropped, {} failed", summary.successes, summary.errors);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResizeSettings;

    #[test]
    fn only_given_flags_override_settings() {
        let base = ManualSettings {
            input_folder: "in".into(),
            output_folder: "out".into(),
            format: OutputFormat::Png,
            resize: ResizeSettings::default(),
        };
        let args = RunArgs {
            format: Some(OutputFormat::Webp),
            method: Some(ResizeMethod::Ratio),
            scale: Some(0.25),
            ..RunArgs::default()
        };

        let settings = args.apply(&base);

        assert_eq!(settings.input_folder, PathBuf::from("in"));
        assert_eq!(settings.format, OutputFormat::Webp);
        assert_eq!(settings.resize.method, ResizeMethod::Ratio);
        assert_eq!(settings.resize.scale_factor, 0.25);
        assert_eq!(settings.resize.width, base.resize.width);
    }

    #[test]
    fn method_and_mode_parsers_are_case_insensitive() {
        assert_eq!(parse_method("Ratio"), Ok(ResizeMethod::Ratio));
        assert_eq!(parse_fixed_mode("PAD"), Ok(FixedMode::Pad));
        assert!(parse_method("stretch").is_err());
    }
}
