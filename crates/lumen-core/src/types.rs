//! Core types for Lumen

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One selectable encoding of the content, as reported by the engine after
/// manifest parse. Field names follow the hls.js level object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityLevel {
    pub height: u32,
    #[serde(default)]
    pub bitrate: u64,
    #[serde(default)]
    pub audio_codec: Option<String>,
    #[serde(default)]
    pub codec_set: Option<String>,
}

impl QualityLevel {
    pub fn new(height: u32, bitrate: u64) -> Self {
        Self {
            height,
            bitrate,
            audio_codec: None,
            codec_set: None,
        }
    }

    pub fn with_codecs(mut self, audio_codec: impl Into<String>, codec_set: impl Into<String>) -> Self {
        self.audio_codec = Some(audio_codec.into());
        self.codec_set = Some(codec_set.into());
        self
    }

    /// Class name of the stats block rendered for this level
    pub fn css_class(&self) -> String {
        format!("resolution-{}", self.height)
    }

    /// Label/value pairs shown in the level's stats block, in display order.
    /// Missing codecs render as `undefined`, the way the page always showed them.
    pub fn stats_fields(&self) -> [(&'static str, String); 4] {
        let or_undefined = |v: &Option<String>| v.clone().unwrap_or_else(|| "undefined".to_string());
        [
            ("audioCodec", or_undefined(&self.audio_codec)),
            ("bitrate", self.bitrate.to_string()),
            ("codecSet", or_undefined(&self.codec_set)),
            ("height", self.height.to_string()),
        ]
    }
}

/// Which level the engine is told to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectedQuality {
    /// Engine's own ABR decides
    #[default]
    Automatic,
    /// Index into the parsed level list
    Forced(usize),
}

/// Telemetry for the most recently appended media segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferTelemetry {
    pub start: f64,
    pub end: f64,
    pub level: usize,
}

/// A buffered time range in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Play/pause toggle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackMode {
    #[default]
    Paused,
    Playing,
}

impl PlaybackMode {
    /// Label the toggle shows in this mode (the action a click performs next)
    pub fn button_label(&self) -> &'static str {
        match self {
            PlaybackMode::Playing => "pause",
            PlaybackMode::Paused => "play",
        }
    }
}
