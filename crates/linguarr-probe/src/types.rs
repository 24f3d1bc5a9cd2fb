//! Stream inventory types.

use serde::{Deserialize, Serialize};

/// The audio and subtitle streams of one media file, in container order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInventory {
    /// Audio streams in the file.
    pub audio_streams: Vec<AudioStream>,
    /// Subtitle streams in the file.
    pub subtitle_streams: Vec<SubtitleStream>,
}

/// One audio stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioStream {
    /// Language tag as found in the container (e.g. "eng", "spa"), if any.
    pub language: Option<String>,
    /// Audio codec (e.g. "aac", "truehd").
    pub codec: String,
}

/// One subtitle stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleStream {
    /// Language tag as found in the container, if any.
    pub language: Option<String>,
    /// Subtitle format (e.g. "subrip", "hdmv_pgs_subtitle").
    pub codec: String,
}

impl StreamInventory {
    /// Iterate over the language tags of all audio streams that carry one.
    pub fn audio_languages(&self) -> impl Iterator<Item = &str> {
        self.audio_streams.iter().filter_map(|s| s.language.as_deref())
    }

    /// Iterate over the language tags of all subtitle streams that carry one.
    pub fn subtitle_languages(&self) -> impl Iterator<Item = &str> {
        self.subtitle_streams
            .iter()
            .filter_map(|s| s.language.as_deref())
    }

    /// True when the file has neither audio nor subtitle streams.
    pub fn is_empty(&self) -> bool {
        self.audio_streams.is_empty() && self.subtitle_streams.is_empty()
    }
}
