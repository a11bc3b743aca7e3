mod pool;

pub use pool::{WorkerPool, DEFAULT_WORKERS};
