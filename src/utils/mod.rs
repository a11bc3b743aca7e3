pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;
pub mod paths;

pub use error::{
    BatchError, BatchResult, ConfigError, PathError, ReviewError, ValidationError,
};
pub use validation::validate_task_config;
pub use formats::{OutputFormat, INPUT_EXTENSIONS, is_supported_input};
pub use fs::{ensure_input_dir, ensure_output_dir, list_input_images};
