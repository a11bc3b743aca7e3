#![allow(dead_code)]

use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use image_batch_lib::processing::{CommandSpec, ProcessOutput, ProcessRunner};

/// Stands in for both ffmpeg and git.
///
/// Transcodes sleep for `delay` and succeed unless the input path ends with
/// `fail_suffix`. Git probes answer `true` for directories under
/// `repo_root`; commits answer with `commit_reply`.
pub struct FakeTools {
    pub delay: Duration,
    pub fail_suffix: Option<String>,
    pub repo_root: Option<std::path::PathBuf>,
    pub commit_reply: ProcessOutput,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeTools {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fail_suffix: None,
            repo_root: None,
            commit_reply: ProcessOutput { code: Some(0), ..Default::default() },
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Every invocation as `[program, args...]`, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn git_calls(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().filter(|c| c[0] == "git").collect()
    }

    fn record(&self, spec: &CommandSpec) -> Vec<String> {
        let mut line = vec![spec.program.to_string_lossy().into_owned()];
        line.extend(spec.args_lossy());
        self.calls.lock().unwrap().push(line.clone());
        line
    }

    fn git(&self, line: &[String]) -> ProcessOutput {
        let dir = Path::new(&line[2]);
        match line[3].as_str() {
            "rev-parse" => {
                let inside = self.repo_root.as_ref().is_some_and(|root| dir.starts_with(root));
                ProcessOutput {
                    code: Some(if inside { 0 } else { 128 }),
                    stdout: if inside { "true\n".into() } else { String::new() },
                    stderr: String::new(),
                }
            }
            "commit" => self.commit_reply.clone(),
            _ => ProcessOutput { code: Some(0), ..Default::default() },
        }
    }
}

#[async_trait]
impl ProcessRunner for FakeTools {
    async fn run(&self, spec: &CommandSpec) -> io::Result<ProcessOutput> {
        let line = self.record(spec);
        if line[0] == "git" {
            return Ok(self.git(&line));
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let input = line
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| line.get(i + 1))
            .cloned()
            .unwrap_or_default();
        let fails = self
            .fail_suffix
            .as_ref()
            .is_some_and(|suffix| input.ends_with(suffix.as_str()));

        Ok(if fails {
            ProcessOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: format!("{input}: Invalid data found when processing input"),
            }
        } else {
            ProcessOutput { code: Some(0), ..Default::default() }
        })
    }
}

pub fn touch_images(dir: &Path, names: &[&str]) {
    std::fs::create_dir_all(dir).unwrap();
    for name in names {
        std::fs::write(dir.join(name), b"not really an image").unwrap();
    }
}
