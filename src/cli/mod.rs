use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{HearingImpairedSuffix, LanguageCodeFormat, NamingSettings};

#[derive(Parser)]
#[command(
    name = "subextract",
    about = "Subextract - Extract text subtitle streams from video files into ISO-639 tagged .srt files",
    version,
    long_about = "Finds SubRip and mov_text subtitle streams in video files and extracts each of them next to the video as <name>.<lang>[.sdh|.cc|.hi|.forced].srt, using ffprobe and ffmpeg."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE", env = "SUBEXTRACT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract text subtitles from video files or directories
    Extract {
        /// Video files or directories to process
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Write subtitle files here instead of next to each video
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        naming: NamingArgs,

        /// Show what would be extracted without running ffmpeg
        #[arg(long)]
        dry_run: bool,

        /// Keep subtitle files that already exist
        #[arg(long)]
        no_overwrite: bool,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Summary format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Report which files contain text subtitles that need extracting
    Test {
        /// Video files or directories to check
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the subtitle streams of a file and the names they would get
    Probe {
        /// Video file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Directory the names are resolved against
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        naming: NamingArgs,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or initialise the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

/// Per-run overrides of the naming settings
#[derive(Args, Debug, Clone, Default)]
pub struct NamingArgs {
    /// Language code format: two (ISO 639-1) or three (ISO 639-2/B) letters
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub language_code: Option<LanguageCodeFormat>,

    /// Suffix for hearing-impaired tracks
    #[arg(long, value_enum, value_name = "SUFFIX")]
    pub hi_suffix: Option<HiSuffixArg>,

    /// Add `.forced` to forced tracks
    #[arg(long, value_name = "BOOL")]
    pub forced_suffix: Option<bool>,

    /// Suffix for tracks without a known language, empty to disable
    #[arg(long, value_name = "LANG")]
    pub default_language: Option<String>,

    /// Use the track title when no language is known
    #[arg(long, value_name = "BOOL")]
    pub fallback_title: Option<bool>,

    /// Derive regional variants (pt-BR, fr-CA, ...) from track titles
    #[arg(long, value_name = "BOOL")]
    pub regional: Option<bool>,
}

/// Hearing-impaired suffix as given on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HiSuffixArg {
    /// Do not mark hearing-impaired tracks
    None,
    /// `.sdh`
    Sdh,
    /// `.cc`
    Cc,
    /// `.hi`, clashes with Hindi
    Hi,
}

impl From<HiSuffixArg> for Option<HearingImpairedSuffix> {
    fn from(arg: HiSuffixArg) -> Self {
        match arg {
            HiSuffixArg::None => None,
            HiSuffixArg::Sdh => Some(HearingImpairedSuffix::Sdh),
            HiSuffixArg::Cc => Some(HearingImpairedSuffix::Cc),
            HiSuffixArg::Hi => Some(HearingImpairedSuffix::Hi),
        }
    }
}

impl NamingArgs {
    /// Apply the flags that were given on top of the configured settings
    pub fn apply(&self, settings: &mut NamingSettings) {
        if let Some(format) = self.language_code {
            settings.language_code = format;
        }
        if let Some(suffix) = self.hi_suffix {
            settings.hearing_impaired_suffix = suffix.into();
        }
        if let Some(forced) = self.forced_suffix {
            settings.forced_suffix = forced;
        }
        if let Some(language) = &self.default_language {
            settings.default_language = language.trim().to_string();
        }
        if let Some(fallback) = self.fallback_title {
            settings.fallback_title = fallback;
        }
        if let Some(regional) = self.regional {
            settings.use_regional = regional;
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
