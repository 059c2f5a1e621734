use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::SubextractError;

/// Container extensions treated as video files
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mk3d", "mp4", "m4v", "mov", "avi", "wmv", "webm", "ts", "m2ts", "mts", "mpg", "mpeg",
    "ogv", "flv", "3gp",
];

/// True when the extension names a video container
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Expand the given paths into the list of files to process.
///
/// Files are kept as given so that unsupported inputs are reported later on.
/// Directories contribute their video files, sorted by path.
pub fn collect_inputs(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            scan_directory(path, recursive, &mut found)?;
            if found.is_empty() {
                tracing::warn!("No video files found in {}", path.display());
            }
            found.sort();
            inputs.extend(found);
        } else if path.exists() {
            inputs.push(path.clone());
        } else {
            return Err(SubextractError::FileError(format!("Path does not exist: {}", path.display())).into());
        }
    }

    Ok(inputs)
}

fn scan_directory(dir: &Path, recursive: bool, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs_err::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            if recursive {
                scan_directory(&path, recursive, found)?;
            }
        } else if path.is_file() && is_video_file(&path) {
            found.push(path);
        }
    }

    Ok(())
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    if seconds < 1.0 {
        return format!("{:.0}ms", seconds.max(0.0) * 1000.0);
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Check if a file exists and is readable
pub fn check_file_accessible(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("Path is not a file: {}", path.display());
    }

    std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("Cannot access file {}: {}", path.display(), e))?;

    Ok(())
}

/// Check if the configured tools are available; ffmpeg only matters when extracting
pub async fn check_dependencies(app: &AppConfig, need_ffmpeg: bool) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(&app.ffprobe_path).await {
        missing.push(format!("{} - required to inspect subtitle streams", app.ffprobe_path));
    }

    if need_ffmpeg && !check_command_available(&app.ffmpeg_path).await {
        missing.push(format!("{} - required to extract subtitles", app.ffmpeg_path));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("-version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
