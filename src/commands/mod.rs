//! Command-line handlers.
//!
//! - `run`: one ad-hoc conversion with the manual settings
//! - `batch`: build a batch from a profile file, review it, run it
//! - `profiles`: list what a profile file resolves to
//! - `smart-crop`: hand a folder to the feature-matching crop tool

mod batch;
mod image;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::core::{AppSettings, AppState, EventLog};
use crate::processing::SystemRunner;

pub use batch::{BatchArgs, ProfilesArgs, render_tasks};
pub use image::{RunArgs, SmartCropArgs};

#[derive(Parser, Debug)]
#[command(
    name = "image-batch",
    version,
    about = "Convert and resize image folders through ffmpeg, one profile at a time"
)]
pub struct Cli {
    /// Settings file [default: <config dir>/image-batch/settings.json]
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Debug-level diagnostics (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write every log event to FILE as JSON lines when the command ends
    #[arg(long, global = true, value_name = "FILE")]
    pub events: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert one folder with the manual settings
    Run(RunArgs),
    /// Build, review and run a batch from a profile file
    Batch(BatchArgs),
    /// List the profiles of a profile file
    Profiles(ProfilesArgs),
    /// Run the smart-crop tool on a folder
    SmartCrop(SmartCropArgs),
}

fn load_settings(path: Option<&Path>) -> Result<AppSettings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match AppSettings::default_path() {
            Some(path) => path,
            None => return Ok(AppSettings::default()),
        },
    };
    debug!("Reading settings from {}", path.display());
    AppSettings::load(&path).with_context(|| format!("Failed to load settings {}", path.display()))
}

fn dump_events(events: &EventLog, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create event file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for event in events.snapshot() {
        serde_json::to_writer(&mut out, &event)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Entry point shared by `main` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.settings.as_deref())?;
    let mut state = AppState::new(settings, Arc::new(SystemRunner));

    let result = match cli.command {
        Command::Run(args) => image::run(&state, args).await,
        Command::Batch(args) => batch::batch(&mut state, args).await,
        Command::Profiles(args) => batch::profiles(&mut state, args),
        Command::SmartCrop(args) => image::smart_crop(&state, args).await,
    };

    if let Some(path) = &cli.events {
        dump_events(state.events(), path)?;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "image-batch", "batch", "--profiles", "p.json", "--yes", "--verbose",
            "--events", "events.jsonl",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.events, Some(PathBuf::from("events.jsonl")));
        assert!(matches!(cli.command, Command::Batch(ref b) if b.yes));
    }

    #[test]
    fn events_are_dumped_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let events = EventLog::new();
        events.info("first");
        events.error("second");

        dump_events(&events, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["severity"], "error");
        assert_eq!(lines[1]["message"], "second");
    }

    #[test]
    fn explicit_missing_settings_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(Some(&dir.path().join("none.json"))).unwrap();
        assert_eq!(settings, AppSettings::default());
    }
}
