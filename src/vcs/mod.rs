//! Version-control integration through the `git` command line.
//!
//! - [`detector`]: decides whether a directory sits inside a working tree.
//! - [`sync`]: stage, commit and push for the directories of a finished task.

mod detector;
mod sync;

pub use detector::{GitCli, RepositoryDetector};
pub use sync::{CommitOutcome, GitStep, GitSync, SyncReport, SyncStatus, commit_message};

#[cfg(test)]
pub use detector::MockRepositoryDetector;
