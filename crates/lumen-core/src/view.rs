//! Presentation boundary: the page's fixed controls and display regions

use crate::types::QualityLevel;

/// Text display regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    CurrentPosition,
    TargetPosition,
    SpeedRate,
    VolumeRate,
    BufferSize,
    SegmentStart,
    SegmentEnd,
    SegmentLevel,
    PlayPauseLabel,
}

impl Region {
    pub const ALL: [Region; 9] = [
        Region::CurrentPosition,
        Region::TargetPosition,
        Region::SpeedRate,
        Region::VolumeRate,
        Region::BufferSize,
        Region::SegmentStart,
        Region::SegmentEnd,
        Region::SegmentLevel,
        Region::PlayPauseLabel,
    ];

    /// Stable name used by renderers
    pub fn name(&self) -> &'static str {
        match self {
            Region::CurrentPosition => "currentPosition",
            Region::TargetPosition => "targetPosition",
            Region::SpeedRate => "speedRate",
            Region::VolumeRate => "volumeRate",
            Region::BufferSize => "bufferSize",
            Region::SegmentStart => "sizeStart",
            Region::SegmentEnd => "sizeEnd",
            Region::SegmentLevel => "level",
            Region::PlayPauseLabel => "playPauseButton",
        }
    }
}

/// Value-carrying input controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Control {
    SeekBar,
    Volume,
    Speed,
}

impl Control {
    pub fn name(&self) -> &'static str {
        match self {
            Control::SeekBar => "seekBar",
            Control::Volume => "volume",
            Control::Speed => "speed",
        }
    }
}

/// Renders player state onto the page
pub trait PlayerView {
    fn set_text(&mut self, region: Region, text: &str);
    fn control_value(&self, control: Control) -> f64;
    fn set_control_value(&mut self, control: Control, value: f64);
    /// Replace the stats panel with one block per level
    fn render_levels(&mut self, levels: &[QualityLevel]);
    fn set_level_highlight(&mut self, height: u32, highlighted: bool);
    /// Make only these resolution selectors clickable
    fn enable_resolution_selectors(&mut self, heights: &[u32]);
}
