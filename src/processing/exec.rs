//! Process-execution seam for every external collaborator.
//!
//! ffmpeg, git and the smart-crop tool are all driven through
//! [`ProcessRunner`], so tests can swap in a fake and never spawn binaries.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// A fully described invocation: program, arguments, environment overrides
/// and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub envs: Vec<(OsString, OsString)>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            envs: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Arguments as UTF-8 (lossy), for logs and assertions
    pub fn args_lossy(&self) -> Vec<String> {
        self.args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    pub fn display(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in self.args_lossy() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }
}

/// Exit code and captured streams of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Both streams, trimmed, for messages that may land on either
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (false, false) => format!("{stdout}\n{stderr}"),
            (false, true) => stdout.to_string(),
            _ => stderr.to_string(),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs to completion and captures both streams.
    ///
    /// `Err` means the process could not be spawned or awaited; a non-zero
    /// exit is an `Ok` with the code set.
    async fn run(&self, command: &CommandSpec) -> io::Result<ProcessOutput>;

    /// Like [`run`](Self::run), additionally forwarding each stdout line to
    /// `lines` as it arrives.
    async fn run_streaming(
        &self,
        command: &CommandSpec,
        lines: UnboundedSender<String>,
    ) -> io::Result<ProcessOutput> {
        let output = self.run(command).await?;
        for line in output.stdout.lines() {
            let _ = lines.send(line.to_string());
        }
        Ok(output)
    }
}

/// Spawns real OS processes via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd.envs(spec.envs.iter().map(|(k, v)| (k, v)));
        if let Some(dir) = &spec.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, command: &CommandSpec) -> io::Result<ProcessOutput> {
        debug!("Running: {}", command.display());
        let output = Self::command(command).output().await?;
        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_streaming(
        &self,
        command: &CommandSpec,
        lines: UnboundedSender<String>,
    ) -> io::Result<ProcessOutput> {
        debug!("Running (streaming): {}", command.display());
        let mut child = Self::command(command).spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("stdout not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("stderr not captured"))?;

        // Drain stderr concurrently so a chatty tool cannot block on a full pipe.
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        // Raw bytes per line: a non-UTF-8 line is passed on lossily instead
        // of ending the read.
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        let mut captured = String::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let raw = buf.strip_suffix(b"\n").unwrap_or(&buf);
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let line = String::from_utf8_lossy(raw).into_owned();
            captured.push_str(&line);
            captured.push('\n');
            let _ = lines.send(line);
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();

        Ok(ProcessOutput {
            code: status.code(),
            stdout: captured,
            stderr,
        })
    }
}
