//! Pixel transcoding delegated to an external ffmpeg binary.
//!
//! - [`filters`]: maps `ResizeSettings` to one `-vf` filter chain.
//! - [`command`]: builds the argument vector for a single file.

mod command;
mod filters;

pub use command::TranscodeCommand;
pub use filters::filter_expression;
