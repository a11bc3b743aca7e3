use crate::core::{ResizeMethod, ResizeSettings, TaskConfig};
use crate::utils::ValidationError;

/// Validates a resolved task before any I/O happens
pub fn validate_task_config(config: &TaskConfig) -> Result<(), ValidationError> {
    validate_resize(&config.resize)
}

/// Validates the parameters the selected resize method will read
pub fn validate_resize(resize: &ResizeSettings) -> Result<(), ValidationError> {
    match resize.method {
        ResizeMethod::Fixed => {
            if resize.width == 0 {
                return Err(ValidationError::settings("Width cannot be 0"));
            }
            if resize.height == 0 {
                return Err(ValidationError::settings("Height cannot be 0"));
            }
        }
        ResizeMethod::Ratio => {
            if !resize.scale_factor.is_finite() || resize.scale_factor <= 0.0 {
                return Err(ValidationError::settings(format!(
                    "Invalid scale factor: {}. Must be a positive number",
                    resize.scale_factor
                )));
            }
        }
    }
    Ok(())
}
