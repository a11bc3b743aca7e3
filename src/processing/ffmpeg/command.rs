//! Typed builder for one ffmpeg transcode invocation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use crate::processing::exec::CommandSpec;
use crate::utils::OutputFormat;

/// One file in, one file out, one filter chain.
#[derive(Debug, Clone)]
pub struct TranscodeCommand {
    program: OsString,
    input: PathBuf,
    output: PathBuf,
    filter: Option<String>,
    format: Option<OutputFormat>,
}

impl TranscodeCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            input: PathBuf::new(),
            output: PathBuf::new(),
            filter: None,
            format: None,
        }
    }

    pub fn input(mut self, path: &Path) -> Self {
        self.input = path.to_path_buf();
        self
    }

    pub fn output(mut self, path: &Path) -> Self {
        self.output = path.to_path_buf();
        self
    }

    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filter = Some(expression.into());
        self
    }

    /// Selects the per-format quality flag, if the format has one
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// `-hide_banner -loglevel error -y -i IN [-vf F] [quality] OUT`
    pub fn build(self) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(&self.input);

        if let Some(filter) = &self.filter {
            spec = spec.args(["-vf", filter.as_str()]);
        }
        if let Some(format) = self.format {
            spec = spec.args(format.quality_args());
        }

        spec.arg(&self.output)
    }
}
