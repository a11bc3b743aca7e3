//! End-to-end runs against a real ffmpeg (built with libwebp).
//!
//! Ignored by default; run with `cargo test --test ffmpeg_e2e -- --ignored`.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use image::{GenericImageView, Rgba, RgbaImage};
use image_batch_lib::core::{AppSettings, AppState};
use image_batch_lib::processing::SystemRunner;

fn require_ffmpeg() {
    let available = Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    assert!(available, "ffmpeg is not on PATH");
}

fn write_source(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]))
        .save(path)
        .unwrap();
}

async fn run_profile(root: &Path, profile: &str) -> AppState {
    let profiles = root.join("profiles.json");
    std::fs::write(&profiles, format!(r#"{{"scenario": {profile}}}"#)).unwrap();

    let mut state = AppState::new(AppSettings::default(), Arc::new(SystemRunner));
    state.load_profiles(&profiles).unwrap();
    state.build_batch().await.unwrap();
    let report = state.confirm_batch().await.unwrap();
    assert_eq!(report.files_failed(), 0, "events: {:?}", state.events().snapshot());
    state
}

#[tokio::test]
#[ignore = "needs ffmpeg on PATH"]
async fn fixed_crop_to_webp_produces_exact_dimensions() {
    require_ffmpeg();
    let root = tempfile::tempdir().unwrap();
    write_source(&root.path().join("in/banner.png"), 400, 200);

    run_profile(
        root.path(),
        r#"{"enable": true, "input_folder": "in", "output_folder": "out",
            "resize_method": "fixed", "width": 100, "height": 50,
            "fixed_mode": "crop", "format": "webp"}"#,
    )
    .await;

    let outputs: Vec<_> = std::fs::read_dir(root.path().join("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(outputs, ["banner.webp"]);
    let dims = image::image_dimensions(root.path().join("out/banner.webp")).unwrap();
    assert_eq!(dims, (100, 50));
}

#[tokio::test]
#[ignore = "needs ffmpeg on PATH"]
async fn fixed_pad_fills_the_shortfall_transparently() {
    require_ffmpeg();
    let root = tempfile::tempdir().unwrap();
    write_source(&root.path().join("in/wide.png"), 400, 200);

    run_profile(
        root.path(),
        r#"{"input_folder": "in", "output_folder": "out", "resize_method": "fixed",
            "width": 100, "height": 100, "fixed_mode": "pad", "format": "png"}"#,
    )
    .await;

    let img = image::open(root.path().join("out/wide.png")).unwrap();
    assert_eq!(img.dimensions(), (100, 100));
    let rgba = img.to_rgba8();
    assert_eq!(rgba.get_pixel(50, 0)[3], 0, "top band should be padding");
    assert_eq!(rgba.get_pixel(50, 50)[3], 255, "center should be the image");
}

#[tokio::test]
#[ignore = "needs ffmpeg on PATH"]
async fn ratio_scales_both_sides() {
    require_ffmpeg();
    let root = tempfile::tempdir().unwrap();
    write_source(&root.path().join("in/photo.png"), 400, 200);

    run_profile(
        root.path(),
        r#"{"input_folder": "in", "output_folder": "out", "resize_method": "ratio",
            "scale_factor": 0.5, "format": "jpg"}"#,
    )
    .await;

    let dims = image::image_dimensions(root.path().join("out/photo.jpg")).unwrap();
    assert_eq!(dims, (200, 100));
}
