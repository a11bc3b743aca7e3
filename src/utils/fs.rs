use std::path::{Path, PathBuf};
use tokio::fs;
use crate::utils::{PathError, formats::is_supported_input};

/// Fails unless `path` is an existing directory
pub async fn ensure_input_dir(path: &Path) -> Result<(), PathError> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PathError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PathError::InputMissing(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Creates `path` and any missing parents. Idempotent.
pub async fn ensure_output_dir(path: &Path) -> Result<(), PathError> {
    fs::create_dir_all(path).await.map_err(PathError::from)
}

/// Lists files directly inside `dir` with a recognized image extension,
/// sorted by name so runs are reproducible.
pub async fn list_input_images(dir: &Path) -> Result<Vec<PathBuf>, PathError> {
    let mut entries = fs::read_dir(dir).await?;
    let mut images = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_supported_input(&path) {
            continue;
        }
        // file_type does not follow symlinks; metadata does
        let is_file = fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false);
        if is_file {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}
