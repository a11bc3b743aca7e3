//! Image processing pipeline.
//!
//! - [`exec`]: the process-execution seam shared by every external tool.
//! - [`ffmpeg`]: filter chains and the transcode command builder.
//! - [`runner`]: one task, all of its files, under the worker pool.
//! - [`batch`]: confirmed tasks in order, with git sync after each.
//! - [`smart_crop`]: the feature-matching crop collaborator.

pub mod batch;
pub mod exec;
pub mod ffmpeg;
pub mod runner;
pub mod smart_crop;

pub use batch::{BatchProcessor, BatchReport, TaskReport};
pub use exec::{CommandSpec, ProcessOutput, ProcessRunner, SystemRunner};
pub use runner::{TaskOutcome, TaskRunner};
pub use smart_crop::{SmartCrop, SmartCropRequest, SmartCropSummary};
