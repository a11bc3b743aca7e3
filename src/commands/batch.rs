//! Handlers for profile-driven work: listing profiles and the review workflow.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use anyhow::{Context, Result, bail};
use clap::Args;

use crate::core::{AppState, BatchTask, FixedMode, ResizeMethod, SyncRole};
use crate::processing::BatchReport;
use crate::utils::ReviewError;

#[derive(Args, Debug)]
pub struct ProfilesArgs {
    /// Profile file (JSON object of named profiles)
    #[arg(long)]
    pub profiles: PathBuf,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Profile file (JSON object of named profiles)
    #[arg(long)]
    pub profiles: PathBuf,

    /// Enable git sync of the input folder for PROFILE (repeatable)
    #[arg(long, value_name = "PROFILE")]
    pub sync_input: Vec<String>,

    /// Enable git sync of the output folder for PROFILE (repeatable)
    #[arg(long, value_name = "PROFILE")]
    pub sync_output: Vec<String>,

    /// Run without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Skip the review table and run straight away
    #[arg(long)]
    pub no_review: bool,
}

fn describe_resize(task: &BatchTask) -> String {
    let resize = &task.config.resize;
    match resize.method {
        ResizeMethod::Ratio => format!("ratio x{}", resize.scale_factor),
        ResizeMethod::Fixed => {
            let mode = match resize.fixed_mode {
                FixedMode::Crop => "crop",
                FixedMode::Pad => "pad",
            };
            format!("{}x{} {}", resize.width, resize.height, mode)
        }
    }
}

fn flag(repo: bool, sync: bool) -> &'static str {
    match (repo, sync) {
        (true, true) => "repo, sync",
        (true, false) => "repo",
        (false, true) => "sync (no repo)",
        (false, false) => "-",
    }
}

/// Plain-text table of a built batch, one row per task.
pub fn render_tasks(tasks: &[BatchTask]) -> String {
    let mut out = String::new();
    for (index, task) in tasks.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {} [{}]", index + 1, task.name, task.config.format);
        if !task.description.is_empty() {
            let _ = writeln!(out, "    {}", task.description);
        }
        let _ = writeln!(out, "    resize: {}", describe_resize(task));
        let _ = writeln!(
            out,
            "    input:  {} ({})",
            task.config.input_dir.display(),
            flag(task.input_is_repo, task.sync_input)
        );
        let _ = writeln!(
            out,
            "    output: {} ({})",
            task.config.output_dir.display(),
            flag(task.output_is_repo, task.sync_output)
        );
    }
    out
}

fn apply_toggles(state: &mut AppState, names: &[String], role: SyncRole) -> Result<()> {
    for name in names {
        let index = state
            .review()
            .tasks()
            .iter()
            .position(|t| &t.name == name)
            .with_context(|| format!("No enabled profile named '{name}' in this batch"))?;
        state.toggle_git_sync(index, role, true)?;
    }
    Ok(())
}

async fn confirm_on_stdin(count: usize) -> Result<bool> {
    print!("Run {count} tasks? [y/N] ");
    io::stdout().flush()?;
    let answer = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(|_| line)
    })
    .await??;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_report(report: &BatchReport) {
    for task in &report.tasks {
        match (&task.outcome, &task.error) {
            (Some(outcome), _) => println!(
                "{}: {} done, {} failed",
                task.name,
                outcome.succeeded(),
                outcome.failed()
            ),
            (None, Some(error)) => println!("{}: skipped ({error})", task.name),
            (None, None) => println!("{}: not run", task.name),
        }
    }
    println!(
        "Total: {} done, {} failed, {} tasks skipped",
        report.files_done(),
        report.files_failed(),
        report.failed_tasks()
    );
}

pub(super) async fn batch(state: &mut AppState, args: BatchArgs) -> Result<()> {
    state
        .load_profiles(&args.profiles)
        .context("Could not load profiles")?;

    match state.build_batch().await {
        Ok(_) => {}
        Err(ReviewError::EmptyBatch) => {
            println!("No enabled profiles, nothing to run");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    apply_toggles(state, &args.sync_input, SyncRole::Input)?;
    apply_toggles(state, &args.sync_output, SyncRole::Output)?;

    if !args.no_review {
        print!("{}", render_tasks(state.review().tasks()));
        if !args.yes && !confirm_on_stdin(state.review().tasks().len()).await? {
            state.cancel_batch()?;
            println!("Cancelled");
            return Ok(());
        }
    }

    let report = state.confirm_batch().await?;
    print_report(&report);
    Ok(())
}

pub(super) fn profiles(state: &mut AppState, args: ProfilesArgs) -> Result<()> {
    let profiles = state
        .load_profiles(&args.profiles)
        .context("Could not load profiles")?;
    if profiles.is_empty() {
        bail!("{} holds no profiles", args.profiles.display());
    }

    for entry in profiles {
        let p = &entry.profile;
        let mut fields = Vec::new();
        if let Some(format) = p.format {
            fields.push(format!("format={format}"));
        }
        if let Some(method) = p.resize_method {
            fields.push(format!("method={method:?}").to_lowercase());
        }
        if let (Some(w), Some(h)) = (p.width, p.height) {
            fields.push(format!("size={w}x{h}"));
        }
        if let Some(scale) = p.scale_factor {
            fields.push(format!("scale={scale}"));
        }
        if let Some(input) = &p.input_folder {
            fields.push(format!("input={}", input.display()));
        }
        if let Some(output) = &p.output_folder {
            fields.push(format!("output={}", output.display()));
        }
        println!(
            "{}{}: {}",
            entry.name,
            if p.enabled { "" } else { " (disabled)" },
            if fields.is_empty() { "manual defaults".to_string() } else { fields.join(", ") }
        );
    }
    Ok(())
}
