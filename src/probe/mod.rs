use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use tokio::process::Command;

use crate::utils;
use crate::SubextractError;

/// Parsed `ffprobe -show_format -show_streams` output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeResult {
    #[serde(default)]
    pub streams: Vec<StreamInfo>,

    #[serde(default)]
    pub format: FormatInfo,
}

/// A single stream as reported by ffprobe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Absolute stream index inside the container
    pub index: u32,

    #[serde(default)]
    pub codec_name: Option<String>,

    #[serde(default)]
    pub codec_type: Option<String>,

    #[serde(default)]
    pub tags: HashMap<String, String>,

    #[serde(default)]
    pub disposition: Disposition,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Disposition {
    #[serde(default)]
    pub forced: u8,

    #[serde(default)]
    pub hearing_impaired: u8,

    #[serde(default)]
    pub attached_pic: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatInfo {
    #[serde(default)]
    pub format_name: Option<String>,

    #[serde(default)]
    pub duration: Option<String>,
}

impl StreamInfo {
    /// Look up a tag regardless of how the muxer cased its key
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.trim().is_empty())
    }

    pub fn language(&self) -> Option<&str> {
        self.tag("language")
    }

    pub fn title(&self) -> Option<&str> {
        self.tag("title")
    }

    pub fn codec_type_is(&self, kind: &str) -> bool {
        self.codec_type.as_deref() == Some(kind)
    }

    pub fn is_forced(&self) -> bool {
        self.disposition.forced != 0
    }

    pub fn is_hearing_impaired(&self) -> bool {
        self.disposition.hearing_impaired != 0
    }
}

impl ProbeResult {
    /// Parse raw ffprobe JSON
    pub fn from_json(json: &[u8]) -> Result<Self> {
        serde_json::from_slice(json)
            .map_err(|e| SubextractError::ProbeFailed(format!("invalid ffprobe output: {}", e)).into())
    }

    /// True when at least one real video stream exists (cover art does not count)
    pub fn has_video(&self) -> bool {
        self.streams
            .iter()
            .any(|stream| stream.codec_type_is("video") && stream.disposition.attached_pic == 0)
    }

    /// Subtitle streams in container order
    pub fn subtitle_streams(&self) -> impl Iterator<Item = &StreamInfo> {
        self.streams.iter().filter(|stream| stream.codec_type_is("subtitle"))
    }

    /// Container duration in seconds
    pub fn duration(&self) -> Option<f64> {
        self.format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| *d > 0.0)
    }
}

/// Trait for inspecting the streams of a media file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Probe the streams of a file
    async fn probe(&self, path: &Path) -> Result<ProbeResult>;
}

/// Probe backed by the ffprobe executable
pub struct FfprobeProbe {
    ffprobe_path: String,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Check if the file exists and is accessible
    async fn validate_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(SubextractError::FileError(format!("File does not exist: {}", path.display())).into());
        }

        if !path.is_file() {
            return Err(SubextractError::FileError(format!("Path is not a file: {}", path.display())).into());
        }

        match fs::metadata(path).await {
            Ok(metadata) => {
                if metadata.len() == 0 {
                    return Err(SubextractError::FileError(format!("File is empty: {}", path.display())).into());
                }
            }
            Err(e) => {
                return Err(SubextractError::FileError(format!(
                    "Cannot access file {}: {}",
                    path.display(),
                    e
                ))
                .into());
            }
        }

        Ok(())
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn probe(&self, path: &Path) -> Result<ProbeResult> {
        self.validate_file(path).await?;

        tracing::debug!("Running {} on {}", self.ffprobe_path, path.display());

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .output()
            .await
            .map_err(|e| SubextractError::ProbeFailed(format!("could not run {}: {}", self.ffprobe_path, e)))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(SubextractError::ProbeFailed(format!(
                "ffprobe exited with {} for {}: {}",
                output.status,
                path.display(),
                error.trim()
            ))
            .into());
        }

        ProbeResult::from_json(&output.stdout)
    }
}

/// Probe a file and make sure it is a video before anything else looks at it
pub async fn probe_video(probe: &dyn MediaProbe, path: &Path) -> Result<ProbeResult> {
    if !utils::is_video_file(path) {
        return Err(SubextractError::NotAVideo(path.display().to_string()).into());
    }

    let result = probe.probe(path).await?;

    if !result.has_video() {
        return Err(SubextractError::NotAVideo(format!("{} (no video stream)", path.display())).into());
    }

    Ok(result)
}
