mod common;

use std::sync::Arc;
use std::time::Duration;
use common::{FakeTools, touch_images};
use image_batch_lib::core::{
    EventLog, FileStatus, ProgressCounters, ResizeMethod, ResizeSettings, Severity, TaskConfig,
};
use image_batch_lib::processing::TaskRunner;
use image_batch_lib::utils::OutputFormat;
use image_batch_lib::worker::WorkerPool;

fn ratio_config(input: &std::path::Path, output: &std::path::Path) -> TaskConfig {
    TaskConfig {
        input_dir: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        format: OutputFormat::Webp,
        resize: ResizeSettings {
            method: ResizeMethod::Ratio,
            scale_factor: 0.5,
            ..ResizeSettings::default()
        },
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_transcodes_never_exceed_the_pool_limit() {
    let dir = tempfile::tempdir().unwrap();
    let names: Vec<String> = (0..12).map(|i| format!("img{i:02}.png")).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    touch_images(&dir.path().join("in"), &names);

    let tools = Arc::new(FakeTools::new(Duration::from_millis(40)));
    let pool = WorkerPool::new(Some(4));
    let progress = ProgressCounters::new();
    let runner = TaskRunner::new(
        tools.clone(),
        "ffmpeg",
        pool.clone(),
        EventLog::new(),
        progress.clone(),
    );

    let outcome = runner
        .run("many", &ratio_config(&dir.path().join("in"), &dir.path().join("out")))
        .await
        .unwrap();

    assert_eq!(outcome.succeeded(), 12);
    assert!(tools.peak() <= 4, "peak was {}", tools.peak());
    assert_eq!(tools.peak(), 4);
    assert!(pool.peak_workers() <= 4);
    assert_eq!(progress.snapshot().current, 12);
    assert_eq!(progress.snapshot().progress_percentage, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_failing_file_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    touch_images(
        &dir.path().join("in"),
        &["a.png", "b.JPG", "broken.jpeg", "d.bmp", "e.webp", "notes.txt"],
    );

    let mut tools = FakeTools::new(Duration::from_millis(5));
    tools.fail_suffix = Some("broken.jpeg".into());
    let tools = Arc::new(tools);
    let events = EventLog::new();
    let runner = TaskRunner::new(
        tools.clone(),
        "ffmpeg",
        WorkerPool::default(),
        events.clone(),
        ProgressCounters::new(),
    );

    let outcome = runner
        .run("mixed", &ratio_config(&dir.path().join("in"), &dir.path().join("out")))
        .await
        .unwrap();

    assert_eq!(outcome.total(), 5);
    assert!(outcome.jobs.iter().all(|j| j.status.is_terminal()));
    let broken = outcome
        .jobs
        .iter()
        .find(|j| j.file_name() == "broken.jpeg")
        .unwrap();
    assert_eq!(broken.status, FileStatus::Error);
    assert_eq!(outcome.succeeded(), 4);

    let errors = events.with_severity(Severity::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Invalid data found"));
    assert_eq!(tools.calls().len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_sources_never_write_the_same_output() {
    let dir = tempfile::tempdir().unwrap();
    touch_images(&dir.path().join("in"), &["photo.png", "photo.jpg", "other.png"]);

    let tools = Arc::new(FakeTools::new(Duration::from_millis(20)));
    let events = EventLog::new();
    let progress = ProgressCounters::new();
    let runner = TaskRunner::new(
        tools.clone(),
        "ffmpeg",
        WorkerPool::default(),
        events.clone(),
        progress.clone(),
    );

    let outcome = runner
        .run("stems", &ratio_config(&dir.path().join("in"), &dir.path().join("out")))
        .await
        .unwrap();

    let status = |name: &str| {
        outcome
            .jobs
            .iter()
            .find(|j| j.file_name() == name)
            .map(|j| j.status)
            .unwrap()
    };
    assert_eq!(status("photo.jpg"), FileStatus::Done);
    assert_eq!(status("photo.png"), FileStatus::Error);
    assert_eq!(status("other.png"), FileStatus::Done);

    let calls = tools.calls();
    assert_eq!(calls.len(), 2);
    assert!(!calls.iter().flatten().any(|arg| arg.ends_with("photo.png")));
    assert_eq!(progress.snapshot().current, 3);

    let errors = events.with_severity(Severity::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("photo.webp"));
}
