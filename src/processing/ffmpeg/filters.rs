//! Maps `ResizeSettings` to a single ffmpeg filter-chain expression.

use crate::core::{FixedMode, ResizeMethod, ResizeSettings};

/// High-quality resampling used by every scale step.
const SCALE_FLAGS: &str = "flags=lanczos";

/// Fully transparent RGBA fill for padding.
const TRANSPARENT: &str = "0x00000000";

/// Builds the `-vf` expression for `settings`.
///
/// Assumes the settings were validated; no clamping happens here.
pub fn filter_expression(settings: &ResizeSettings) -> String {
    match settings.method {
        ResizeMethod::Ratio => scale_by(settings.scale_factor),
        ResizeMethod::Fixed => match settings.fixed_mode {
            FixedMode::Crop => cover_and_crop(settings.width, settings.height),
            FixedMode::Pad => fit_and_pad(settings.width, settings.height),
        },
    }
}

/// Uniform scale, aspect preserved. Each side is floored at one pixel; the
/// comma inside `max` is escaped from the filter-graph parser.
fn scale_by(factor: f64) -> String {
    format!(
        "scale=max(1\\,trunc(iw*{factor})):max(1\\,trunc(ih*{factor})):{SCALE_FLAGS}"
    )
}

/// Scale until the box is covered (larger side overflows), then center-crop.
fn cover_and_crop(width: u32, height: u32) -> String {
    format!(
        "scale={width}:{height}:force_original_aspect_ratio=increase:{SCALE_FLAGS},\
         crop={width}:{height}"
    )
}

/// Scale until the image fits inside the box, then center-pad the shortfall
/// with transparent pixels. `format=rgba` gives pad an alpha channel to fill.
fn fit_and_pad(width: u32, height: u32) -> String {
    format!(
        "scale={width}:{height}:force_original_aspect_ratio=decrease:{SCALE_FLAGS},\
         format=rgba,\
         pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:color={TRANSPARENT}"
    )
}
