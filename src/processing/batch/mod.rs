mod processor;

pub use processor::{BatchProcessor, BatchReport, TaskReport};
