use serde::Serialize;
use std::collections::HashSet;

use crate::config::NamingSettings;
use crate::naming;
use crate::probe::{ProbeResult, StreamInfo};

/// One subtitle stream selected for extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitlePlan {
    /// Position among all subtitle streams, as used by `-map 0:s:<id>`
    pub stream_id: usize,

    /// Absolute stream index in the container
    pub stream_index: u32,

    pub codec_name: String,

    pub language: Option<String>,

    pub title: Option<String>,

    /// File name tag, e.g. `.en.sdh`
    pub tag: String,
}

impl SubtitlePlan {
    /// ffmpeg arguments selecting this stream
    pub fn stream_mapping(&self) -> Vec<String> {
        vec!["-map".to_string(), format!("0:s:{}", self.stream_id)]
    }
}

/// Decides which subtitle streams get extracted and how they are named
pub struct StreamMapper {
    settings: NamingSettings,
    text_codecs: Vec<String>,
}

impl StreamMapper {
    pub fn new(settings: NamingSettings, text_codecs: &[String]) -> Self {
        Self {
            settings,
            text_codecs: text_codecs
                .iter()
                .map(|codec| codec.trim().to_lowercase())
                .filter(|codec| !codec.is_empty())
                .collect(),
        }
    }

    /// Text based subtitle streams are the only ones that need processing
    pub fn stream_needs_processing(&self, stream: &StreamInfo) -> bool {
        stream.codec_type_is("subtitle")
            && stream
                .codec_name
                .as_deref()
                .map(|codec| self.text_codecs.iter().any(|known| known.eq_ignore_ascii_case(codec)))
                .unwrap_or(false)
    }

    /// True when the file has at least one stream to extract
    pub fn streams_need_processing(&self, probe: &ProbeResult) -> bool {
        probe.subtitle_streams().any(|stream| self.stream_needs_processing(stream))
    }

    /// Build a plan per extractable stream; duplicate tags get the stream index appended
    pub fn subtitle_plans(&self, probe: &ProbeResult) -> Vec<SubtitlePlan> {
        let mut used_tags = HashSet::new();
        let mut plans = Vec::new();

        for (stream_id, stream) in probe.subtitle_streams().enumerate() {
            if !self.stream_needs_processing(stream) {
                tracing::debug!(
                    "Skipping subtitle stream {} ({})",
                    stream.index,
                    stream.codec_name.as_deref().unwrap_or("unknown codec")
                );
                continue;
            }

            let mut tag = naming::subtitle_tag(stream, &self.settings);
            if !used_tags.insert(tag.to_lowercase()) {
                let unique = format!("{}.{}", tag, stream.index);
                tracing::warn!(
                    "Subtitle stream {} would reuse tag '{}', using '{}' instead",
                    stream.index,
                    tag,
                    unique
                );
                used_tags.insert(unique.to_lowercase());
                tag = unique;
            }

            plans.push(SubtitlePlan {
                stream_id,
                stream_index: stream.index,
                codec_name: stream.codec_name.clone().unwrap_or_default(),
                language: stream.language().map(str::to_string),
                title: stream.title().map(str::to_string),
                tag,
            });
        }

        plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, HearingImpairedSuffix};
    use crate::probe::tests::sample;

    fn mapper(settings: NamingSettings) -> StreamMapper {
        StreamMapper::new(settings, &AppConfig::default().text_codecs)
    }

    #[test]
    fn test_only_text_streams_are_planned() {
        let plans = mapper(NamingSettings::default()).subtitle_plans(&sample());

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].stream_id, 0);
        assert_eq!(plans[0].stream_index, 2);
        assert_eq!(plans[0].tag, ".en");
        // the PGS stream still counts towards the subtitle position
        assert_eq!(plans[1].stream_id, 2);
        assert_eq!(plans[1].stream_index, 4);
        assert_eq!(plans[1].tag, ".pt-BR");
        assert_eq!(plans[1].stream_mapping(), vec!["-map", "0:s:2"]);
    }

    #[test]
    fn test_settings_flow_into_tags() {
        let settings = NamingSettings {
            hearing_impaired_suffix: Some(HearingImpairedSuffix::Sdh),
            use_regional: false,
            ..Default::default()
        };
        let plans = mapper(settings).subtitle_plans(&sample());
        let tags: Vec<_> = plans.iter().map(|p| p.tag.as_str()).collect();
        assert_eq!(tags, vec![".en.sdh", ".pt"]);
    }

    #[test]
    fn test_streams_need_processing() {
        let m = mapper(NamingSettings::default());
        assert!(m.streams_need_processing(&sample()));

        let mut bitmap_only = sample();
        bitmap_only.streams.retain(|s| s.codec_name.as_deref() != Some("subrip") && s.codec_name.as_deref() != Some("mov_text"));
        assert!(!m.streams_need_processing(&bitmap_only));
        assert!(m.subtitle_plans(&bitmap_only).is_empty());
    }

    #[test]
    fn test_codec_match_ignores_case() {
        let m = StreamMapper::new(NamingSettings::default(), &[" SubRip ".to_string()]);
        assert!(m.streams_need_processing(&sample()));
        assert_eq!(m.subtitle_plans(&sample()).len(), 1);
    }

    #[test]
    fn test_duplicate_tags_get_index() {
        let mut probe = sample();
        let mut twin = probe.streams[2].clone();
        twin.index = 5;
        twin.tags.remove("title");
        probe.streams.push(twin);

        let plans = mapper(NamingSettings::default()).subtitle_plans(&probe);
        let tags: Vec<_> = plans.iter().map(|p| p.tag.as_str()).collect();
        assert_eq!(tags, vec![".en", ".pt-BR", ".en.5"]);
        assert_eq!(plans[2].stream_id, 3);
    }
}
