// Module declarations in dependency order
pub mod utils;
pub mod worker;
pub mod processing;
pub mod vcs;
pub mod core;
pub mod commands;

// Public exports for external consumers
pub use crate::core::{
    AppSettings, AppState, BatchTask, EventLog, ManualSettings, Profile, ProfileStore,
    ReviewQueue, TaskBuilder, TaskConfig,
};
pub use crate::processing::{BatchProcessor, BatchReport, TaskOutcome, TaskRunner};
pub use crate::utils::{BatchError, BatchResult};

// This library file is the engine behind the image-batch binary.
// The command line entry point is in main.rs.
