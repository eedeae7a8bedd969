//! Player configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Default demo stream
pub const DEFAULT_SOURCE_URL: &str = "https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8";

/// A fixed resolution selector on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPreset {
    /// Element id of the selector control
    pub control: String,
    /// Level height the selector forces
    pub height: u32,
}

impl ResolutionPreset {
    pub fn new(control: impl Into<String>, height: u32) -> Self {
        Self {
            control: control.into(),
            height,
        }
    }
}

/// Player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerConfig {
    /// Manifest to load
    pub source_url: Url,
    /// Resolution selectors, lowest first
    pub resolution_presets: Vec<ResolutionPreset>,
    /// Class toggled on the selected level's stats block
    pub highlight_class: String,
    /// Storage key for the volume fraction
    pub volume_key: String,
    /// Storage key for the last playback position
    pub position_key: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            source_url: Url::parse(DEFAULT_SOURCE_URL).expect("default source URL is valid"),
            resolution_presets: vec![
                ResolutionPreset::new("veryLowResolution", 184),
                ResolutionPreset::new("lowResolution", 288),
                ResolutionPreset::new("mediumResolution", 480),
                ResolutionPreset::new("hightResolution", 720),
                ResolutionPreset::new("veryHightResolution", 1080),
            ],
            highlight_class: "color".to_string(),
            volume_key: "volume".to_string(),
            position_key: "seekTime".to_string(),
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON config; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Config for a different source with default everything else
    pub fn with_source(source: &str) -> Result<Self> {
        Ok(Self {
            source_url: Url::parse(source)?,
            ..Default::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution_presets.is_empty() {
            return Err(Error::InvalidConfig("no resolution presets".into()));
        }
        let mut seen = HashSet::new();
        for preset in &self.resolution_presets {
            if !seen.insert(preset.height) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate resolution height {}",
                    preset.height
                )));
            }
        }
        if self.volume_key == self.position_key {
            return Err(Error::InvalidConfig(
                "volume and position storage keys must differ".into(),
            ));
        }
        Ok(())
    }

    /// Heights of every configured selector
    pub fn preset_heights(&self) -> Vec<u32> {
        self.resolution_presets.iter().map(|p| p.height).collect()
    }
}
