use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::SubextractError;

/// File name looked up in the working directory before the user config dir
const LOCAL_CONFIG_FILE: &str = "subextract.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings that decide how extracted files are named
    pub naming: NamingSettings,

    /// Application settings
    pub app: AppConfig,
}

/// Which ISO 639 flavour ends up in the file name
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCodeFormat {
    /// ISO 639-1, two letters (en, fr, pt)
    Two,
    /// ISO 639-2/B, three letters (eng, fre, por)
    Three,
}

/// Suffix used to mark hearing-impaired tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HearingImpairedSuffix {
    /// Subtitles for the Deaf and Hard of Hearing
    Sdh,
    /// Closed Captioning
    Cc,
    /// Hearing-Impaired (clashes with the Hindi language code)
    Hi,
}

impl HearingImpairedSuffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            HearingImpairedSuffix::Sdh => "sdh",
            HearingImpairedSuffix::Cc => "cc",
            HearingImpairedSuffix::Hi => "hi",
        }
    }
}

impl std::fmt::Display for HearingImpairedSuffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingSettings {
    /// Language code format used in the suffix
    pub language_code: LanguageCodeFormat,

    /// Suffix added after the language for hearing-impaired tracks
    pub hearing_impaired_suffix: Option<HearingImpairedSuffix>,

    /// Add `.forced` after the language for forced tracks
    pub forced_suffix: bool,

    /// Suffix for tracks with no or unknown language, empty to disable
    pub default_language: String,

    /// Use the track title when no language information exists
    pub fallback_title: bool,

    /// Derive regional variants such as pt-BR or fr-CA from the track title
    pub use_regional: bool,
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            language_code: LanguageCodeFormat::Two,
            hearing_impaired_suffix: None,
            forced_suffix: false,
            default_language: "en".to_string(),
            fallback_title: true,
            use_regional: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// ffmpeg executable
    pub ffmpeg_path: String,

    /// ffprobe executable
    pub ffprobe_path: String,

    /// Subtitle codecs treated as text and extracted
    pub text_codecs: Vec<String>,

    /// Replace subtitle files that already exist
    pub overwrite: bool,

    /// Descend into subdirectories when a directory is given
    pub recursive: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            text_codecs: vec![
                "srt".to_string(),
                "subrip".to_string(),
                "mov_text".to_string(),
            ],
            overwrite: true,
            recursive: false,
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path).await?;
            tracing::debug!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub async fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?).await
    }

    /// Save configuration to file
    pub async fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("subextract").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.app.ffmpeg_path.trim().is_empty() {
            return Err(SubextractError::InvalidSettings("ffmpeg path must not be empty".into()).into());
        }

        if self.app.ffprobe_path.trim().is_empty() {
            return Err(SubextractError::InvalidSettings("ffprobe path must not be empty".into()).into());
        }

        if self.app.text_codecs.iter().all(|codec| codec.trim().is_empty()) {
            return Err(SubextractError::InvalidSettings(
                "at least one text subtitle codec must be configured".into(),
            )
            .into());
        }

        if self.naming.default_language.contains(['/', '\\']) {
            return Err(SubextractError::InvalidSettings(format!(
                "default language '{}' must not contain path separators",
                self.naming.default_language
            ))
            .into());
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        let naming = &self.naming;
        println!("Current Configuration:");
        println!("  Language Code: {}", match naming.language_code {
            LanguageCodeFormat::Two => "ISO 639-1 (2 letters)",
            LanguageCodeFormat::Three => "ISO 639-2/B (3 letters)",
        });
        println!(
            "  Hearing-Impaired Suffix: {}",
            naming.hearing_impaired_suffix.map(|s| s.as_str()).unwrap_or("disabled")
        );
        println!("  Forced Suffix: {}", if naming.forced_suffix { "forced" } else { "disabled" });
        if naming.default_language.is_empty() {
            println!("  Default Language: disabled");
        } else {
            println!("  Default Language: {}", naming.default_language);
        }
        println!("  Fallback To Title: {}", naming.fallback_title);
        println!("  Regional Variants: {}", naming.use_regional);
        println!("  ffmpeg: {}", self.app.ffmpeg_path);
        println!("  ffprobe: {}", self.app.ffprobe_path);
        println!("  Text Codecs: {}", self.app.text_codecs.join(", "));
        println!("  Overwrite: {}", self.app.overwrite);
        println!("  Recursive: {}", self.app.recursive);
    }
}
