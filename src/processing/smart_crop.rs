//! Wrapper around the external feature-matching crop tool.
//!
//! The tool prints one JSON object per stdout line, `{"msg": .., "type": ..}`,
//! which is forwarded to the event log while the process is still running.

use std::path::PathBuf;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::core::{EventLog, Severity};
use crate::processing::exec::{CommandSpec, ProcessRunner};
use crate::utils::{BatchError, BatchResult};

pub const DEFAULT_CROP_WIDTH: u32 = 456;
pub const DEFAULT_CROP_HEIGHT: u32 = 564;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartCropRequest {
    pub templates: PathBuf,
    pub input: PathBuf,
    pub output_high: Option<PathBuf>,
    pub output_fixed: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

impl SmartCropRequest {
    pub fn new(templates: PathBuf, input: PathBuf) -> Self {
        Self {
            templates,
            input,
            output_high: None,
            output_fixed: None,
            width: DEFAULT_CROP_WIDTH,
            height: DEFAULT_CROP_HEIGHT,
        }
    }

    /// Appends the tool flags to `command`.
    fn apply(&self, command: CommandSpec) -> CommandSpec {
        let mut spec = command
            .arg("--templates")
            .arg(&self.templates)
            .arg("--input")
            .arg(&self.input);
        if let Some(dir) = &self.output_high {
            spec = spec.arg("--output-high").arg(dir);
        }
        if let Some(dir) = &self.output_fixed {
            spec = spec.arg("--output-fixed").arg(dir);
        }
        spec.arg("--width")
            .arg(self.width.to_string())
            .arg("--height")
            .arg(self.height.to_string())
    }
}

#[derive(Deserialize)]
struct ToolLine {
    msg: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Maps one stdout line to an event. Lines that are not tool JSON are
/// passed through as informational messages.
pub fn parse_line(line: &str) -> (Severity, String) {
    match serde_json::from_str::<ToolLine>(line) {
        Ok(parsed) => (Severity::from_tag(&parsed.kind), parsed.msg),
        Err(_) => (Severity::Info, line.to_string()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SmartCropSummary {
    pub successes: usize,
    pub errors: usize,
}

pub struct SmartCrop {
    runner: Arc<dyn ProcessRunner>,
    command: Vec<String>,
    events: EventLog,
}

impl SmartCrop {
    /// `command` is the program followed by its leading arguments,
    /// e.g. `["python", "smart_crop.py"]`.
    pub fn new(runner: Arc<dyn ProcessRunner>, command: Vec<String>, events: EventLog) -> Self {
        Self { runner, command, events }
    }

    fn command_spec(&self, request: &SmartCropRequest) -> BatchResult<CommandSpec> {
        let (program, leading) = self
            .command
            .split_first()
            .ok_or_else(|| BatchError::external_tool("smart-crop command is empty"))?;
        Ok(request.apply(CommandSpec::new(program).args(leading)))
    }

    pub async fn run(&self, request: &SmartCropRequest) -> BatchResult<SmartCropSummary> {
        let spec = match self.command_spec(request) {
            Ok(spec) => spec,
            Err(e) => {
                self.events.error(e.to_string());
                return Err(e);
            }
        };
        self.events.info(format!("Starting smart crop of {}", request.input.display()));
        debug!("Running {}", spec.display());

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let events = self.events.clone();
        let forward = tokio::spawn(async move {
            let mut summary = SmartCropSummary::default();
            while let Some(line) = rx.recv().await {
                if line.trim().is_empty() {
                    continue;
                }
                let (severity, message) = parse_line(&line);
                match severity {
                    Severity::Success => summary.successes += 1,
                    Severity::Error => summary.errors += 1,
                    Severity::Info => {}
                }
                events.push(severity, message);
            }
            summary
        });

        let result = self.runner.run_streaming(&spec, tx).await;
        let summary = forward.await.unwrap_or_else(|e| {
            warn!("Smart crop log forwarder stopped: {}", e);
            SmartCropSummary::default()
        });

        let failure = match result {
            Ok(output) if output.success() => None,
            Ok(output) => Some(format!(
                "smart crop exited with {:?}: {}",
                output.code,
                output.stderr.trim()
            )),
            Err(e) => Some(format!("could not start smart crop: {e}")),
        };

        if let Some(message) = failure {
            let err = BatchError::external_tool(message);
            self.events.error(err.to_string());
            return Err(err);
        }

        self.events.success(format!(
            "Smart crop finished: {} cropped, {} failed",
            summary.successes, summary.errors
        ));
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::exec::{MockProcessRunner, ProcessOutput};

    #[test]
    fn json_lines_carry_their_severity() {
        assert_eq!(
            parse_line(r#"{"msg": "cropped a.png", "type": "success"}"#),
            (Severity::Success, "cropped a.png".to_string())
        );
        assert_eq!(
            parse_line(r#"{"msg": "no match", "type": "error"}"#),
            (Severity::Error, "no match".to_string())
        );
        assert_eq!(parse_line(r#"{"msg": "hm", "type": "debug"}"#).0, Severity::Info);
    }

    #[test]
    fn plain_lines_are_informational() {
        assert_eq!(
            parse_line("Loading templates..."),
            (Severity::Info, "Loading templates...".to_string())
        );
    }

    #[test]
    fn optional_outputs_only_appear_when_set() {
        let mut request = SmartCropRequest::new("t".into(), "in".into());
        request.output_fixed = Some("fixed".into());
        let spec = request.apply(CommandSpec::new("python").arg("smart_crop.py"));

        assert_eq!(
            spec.args_lossy(),
            [
                "smart_crop.py", "--templates", "t", "--input", "in",
                "--output-fixed", "fixed", "--width", "456", "--height", "564",
            ]
        );
    }

    #[tokio::test]
    async fn streamed_lines_become_events() {
        let mut mock = MockProcessRunner::new();
        mock.expect_run_streaming().returning(|_, lines| {
            lines.send(r#"{"msg":"a.png cropped","type":"success"}"#.into()).unwrap();
            lines.send(r#"{"msg":"b.png: no template","type":"error"}"#.into()).unwrap();
            lines.send(String::new()).unwrap();
            Ok(ProcessOutput { code: Some(0), ..Default::default() })
        });
        let events = EventLog::new();
        let crop = SmartCrop::new(
            Arc::new(mock),
            vec!["python".into(), "smart_crop.py".into()],
            events.clone(),
        );

        let summary = crop
            .run(&SmartCropRequest::new("t".into(), "in".into()))
            .await
            .unwrap();

        assert_eq!(summary, SmartCropSummary { successes: 1, errors: 1 });
        assert!(events.snapshot().iter().any(|e| e.message == "b.png: no template"));
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_external_tool_error() {
        let mut mock = MockProcessRunner::new();
        mock.expect_run_streaming().returning(|_, _| {
            Ok(ProcessOutput {
                code: Some(2),
                stdout: String::new(),
                stderr: "ModuleNotFoundError: cv2".into(),
            })
        });
        let events = EventLog::new();
        let crop = SmartCrop::new(Arc::new(mock), vec!["python".into()], events.clone());

        let result = crop.run(&SmartCropRequest::new("t".into(), "in".into())).await;

        assert!(matches!(result, Err(BatchError::ExternalTool(m)) if m.contains("cv2")));
        assert_eq!(events.with_severity(Severity::Error).len(), 1);
    }

    #[tokio::test]
    async fn empty_command_is_rejected_without_spawning() {
        let mut mock = MockProcessRunner::new();
        mock.expect_run_streaming().never();
        let crop = SmartCrop::new(Arc::new(mock), Vec::new(), EventLog::new());

        let result = crop.run(&SmartCropRequest::new("t".into(), "in".into())).await;
        assert!(result.is_err());
    }
}
