//! Core application types and state management.
//!
//! - [`AppState`]: wires settings, profiles, review and the tool runners
//! - [`ProfileStore`] / [`TaskBuilder`]: from profile file to resolved tasks
//! - [`ReviewQueue`]: confirm/cancel gate in front of a batch
//! - [`EventLog`] / [`ProgressCounters`]: the shared sinks every stage writes to

mod events;
mod profiles;
mod progress;
mod review;
mod settings;
mod state;
mod task;
mod types;

pub use events::{EventLog, LogEvent, Severity};
pub use profiles::{NamedProfile, ProfileStore};
pub use progress::{Progress, ProgressCounters};
pub use review::{ReviewQueue, ReviewState};
pub use settings::AppSettings;
pub use state::AppState;
pub use task::TaskBuilder;
pub use types::{
    BatchTask, FileJob, FileStatus, FixedMode, ManualSettings, Profile, ResizeMethod,
    ResizeSettings, SyncRole, TaskConfig,
};
