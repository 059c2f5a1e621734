//! Subtitle file naming.
//!
//! A subtitle tag is the part between the video stem and `.srt`, for example
//! `.pt-BR`, `.en.sdh` or `.fr.forced`. Tags are built purely from stream metadata
//! and the naming settings, so the same input always gives the same file names.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::{LanguageCodeFormat, NamingSettings};
use crate::probe::StreamInfo;

pub mod languages;

/// Suffix appended to forced tracks when enabled
pub const FORCED_SUFFIX: &str = "forced";

/// Extension of every extracted file
pub const SUBTITLE_EXTENSION: &str = "srt";

/// Language part of the tag, `None` when the stream carries no usable language
pub fn language_tag(stream: &StreamInfo, settings: &NamingSettings) -> Option<String> {
    let language = stream.language()?.trim().to_lowercase();
    if language.is_empty() || language == "und" {
        return None;
    }

    match settings.language_code {
        LanguageCodeFormat::Three => {
            if language.len() == 2 {
                Some(languages::to_iso639_2b(&language).map(String::from).unwrap_or(language))
            } else {
                Some(language)
            }
        }
        LanguageCodeFormat::Two => {
            let short = languages::to_iso639_1(&language)?;
            if settings.use_regional {
                let title = lowercase_title(stream);
                if let Some(regional) = regional_variant(short, &title) {
                    return Some(regional.to_string());
                }
            }
            Some(short.to_string())
        }
    }
}

/// Regional spelling guessed from a lower-cased track title
pub fn regional_variant(language: &str, title: &str) -> Option<&'static str> {
    let has = |needle: &str| title.contains(needle);

    match language {
        "en" => {
            if (has("united") && has("states")) || has("usa") || has("america") {
                Some("en-US")
            } else if (has("united") && has("kingdom")) || (has("great") && has("britain")) || has("uk") {
                Some("en-GB")
            } else {
                None
            }
        }
        "fr" => (has("canad") || has("quebec") || has("québec")).then_some("fr-CA"),
        "es" => {
            if has("mexic") || has("méxic") {
                Some("es-MX")
            } else if has("latin") || has("america") {
                Some("ea")
            } else {
                None
            }
        }
        "pt" => (has("brazil") || has("brasil")).then_some("pt-BR"),
        _ => None,
    }
}

/// Hearing-impaired when flagged by the container or named so in the title
pub fn is_hearing_impaired(stream: &StreamInfo) -> bool {
    if stream.is_hearing_impaired() {
        return true;
    }

    let title = lowercase_title(stream);
    title_words(&title).any(|word| matches!(word, "sdh" | "cc" | "hi"))
        || (title.contains("hearing") && title.contains("impaired"))
}

/// Forced when flagged by the container or the title mentions it
pub fn is_forced(stream: &StreamInfo) -> bool {
    stream.is_forced() || lowercase_title(stream).contains("force")
}

/// Build the full tag for a stream, always starting with a dot
pub fn subtitle_tag(stream: &StreamInfo, settings: &NamingSettings) -> String {
    let mut tag = String::new();

    match language_tag(stream, settings) {
        Some(language) => {
            push_part(&mut tag, &language);

            match settings.hearing_impaired_suffix {
                Some(suffix) if is_hearing_impaired(stream) => push_part(&mut tag, suffix.as_str()),
                _ => {
                    if settings.forced_suffix && is_forced(stream) {
                        push_part(&mut tag, FORCED_SUFFIX);
                    }
                }
            }
        }
        None => {
            if settings.fallback_title {
                if let Some(title) = stream.title() {
                    push_part(&mut tag, title.trim());
                }
            }

            if !settings.default_language.trim().is_empty() {
                push_part(&mut tag, settings.default_language.trim());
            }
        }
    }

    if tag.is_empty() {
        push_part(&mut tag, &stream.index.to_string());
    }

    sanitize_tag(&tag)
}

/// Replace whitespace with `-` and characters that cannot appear in file names with `_`
pub fn sanitize_tag(tag: &str) -> String {
    tag.chars()
        .map(|c| match c {
            c if c.is_whitespace() => '-',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// `<dir>/<stem><tag>.srt`, dir defaulting to the directory of the original file
pub fn output_path(original: &Path, output_dir: Option<&Path>, tag: &str) -> PathBuf {
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| original.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    let mut name: OsString = original.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
    name.push(tag);
    name.push(".");
    name.push(SUBTITLE_EXTENSION);

    dir.join(name)
}

fn push_part(tag: &mut String, part: &str) {
    tag.push('.');
    tag.push_str(part);
}

fn lowercase_title(stream: &StreamInfo) -> String {
    stream.title().map(str::to_lowercase).unwrap_or_default()
}

fn title_words(title: &str) -> impl Iterator<Item = &str> {
    title.split(|c: char| !c.is_alphanumeric()).filter(|word| !word.is_empty())
}
