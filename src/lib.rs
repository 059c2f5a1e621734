//! Subextract - A Rust CLI tool for extracting text subtitles from video files
//!
//! This library probes video files with ffprobe, picks out the text based subtitle
//! streams (SubRip and mov_text) and extracts each one to a standalone `.srt` file
//! next to the video. Output names carry ISO 639-1 or ISO 639-2 language codes plus
//! optional hearing-impaired, forced and regional suffixes.

pub mod cli;
pub mod config;
pub mod extract;
pub mod mapper;
pub mod naming;
pub mod output;
pub mod probe;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::{Config, NamingSettings};
pub use extract::{ExtractionPipeline, ExtractionResult};
pub use mapper::{StreamMapper, SubtitlePlan};
pub use probe::{FfprobeProbe, MediaProbe, ProbeResult, StreamInfo};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to subtitle extraction
#[derive(thiserror::Error, Debug)]
pub enum SubextractError {
    #[error("Not a video file: {0}")]
    NotAVideo(String),

    #[error("Stream probe failed: {0}")]
    ProbeFailed(String),

    #[error("Subtitle extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("File operation failed: {0}")]
    FileError(String),
}
