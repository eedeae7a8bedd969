//! Playback bridge over the native media element
//!
//! Wraps imperative media control and the capability-probed fullscreen toggle.

use crate::{types::TimeRange, Error, Result};
use tracing::debug;

/// Native media element (an `HTMLVideoElement` in the browser)
pub trait MediaElement {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// NaN until metadata is loaded
    fn duration(&self) -> f64;
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn buffered(&self) -> Vec<TimeRange>;
}

/// Where a fullscreen capability is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenTarget {
    Document,
    /// The element that goes fullscreen
    Container,
}

/// Dynamic property lookup on the page's document and player container
pub trait FullscreenHost {
    /// Whether `name` is set (non-null) on the target
    fn is_present(&self, target: FullscreenTarget, name: &str) -> bool;
    /// Call the zero-argument method `name` on the target
    fn invoke(&self, target: FullscreenTarget, name: &str) -> Result<()>;
}

/// Host with no fullscreen support at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFullscreen;

impl FullscreenHost for NoFullscreen {
    fn is_present(&self, _target: FullscreenTarget, _name: &str) -> bool {
        false
    }

    fn invoke(&self, _target: FullscreenTarget, _name: &str) -> Result<()> {
        Ok(())
    }
}

/// Document properties holding the current fullscreen element
pub const FULLSCREEN_ELEMENT: [&str; 4] = [
    "fullscreenElement",
    "mozFullScreenElement",
    "webkitFullscreenElement",
    "msFullscreenElement",
];

/// Container methods entering fullscreen, in preference order
pub const REQUEST_FULLSCREEN: [&str; 4] = [
    "requestFullscreen",
    "mozRequestFullScreen",
    "webkitRequestFullscreen",
    "msRequestFullscreen",
];

/// Document methods leaving fullscreen, in preference order
pub const EXIT_FULLSCREEN: [&str; 4] = [
    "exitFullscreen",
    "msExitFullscreen",
    "mozCancelFullScreen",
    "webkitExitFullscreen",
];

/// First candidate for which `probe` holds
pub fn first_present<'a>(candidates: &[&'a str], mut probe: impl FnMut(&str) -> bool) -> Option<&'a str> {
    candidates.iter().copied().find(|name| probe(name))
}

/// What a fullscreen toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenAction {
    Entered(&'static str),
    Exited(&'static str),
    /// No known capability exists; nothing happened
    Unavailable,
}

/// Thin adapter issuing commands to the media element
pub struct PlaybackBridge {
    media: Box<dyn MediaElement>,
    fullscreen: Box<dyn FullscreenHost>,
}

impl PlaybackBridge {
    pub fn new(media: Box<dyn MediaElement>, fullscreen: Box<dyn FullscreenHost>) -> Self {
        Self { media, fullscreen }
    }

    pub fn play(&mut self) -> Result<()> {
        self.media.play()
    }

    pub fn pause(&mut self) {
        self.media.pause();
    }

    pub fn is_paused(&self) -> bool {
        self.media.is_paused()
    }

    pub fn current_time(&self) -> f64 {
        self.media.current_time()
    }

    pub fn duration(&self) -> f64 {
        self.media.duration()
    }

    /// Duration once metadata is loaded
    pub fn known_duration(&self) -> Option<f64> {
        let duration = self.media.duration();
        (duration.is_finite() && duration > 0.0).then_some(duration)
    }

    pub fn buffered_ranges(&self) -> Vec<TimeRange> {
        self.media.buffered()
    }

    /// Seek to an absolute position in seconds
    pub fn seek_to(&mut self, seconds: f64) {
        self.media.set_current_time(seconds.max(0.0));
    }

    /// Seek to `fraction * duration`, fraction clamped to [0, 1]
    pub fn seek_to_fraction(&mut self, fraction: f64) -> Result<f64> {
        let duration = self.known_duration().ok_or(Error::DurationUnknown)?;
        let target = fraction.clamp(0.0, 1.0) * duration;
        self.media.set_current_time(target);
        Ok(target)
    }

    pub fn playback_rate(&self) -> f64 {
        self.media.playback_rate()
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.media.set_playback_rate(rate);
    }

    pub fn volume(&self) -> f64 {
        self.media.volume()
    }

    /// Set the volume fraction, clamped to [0, 1]
    pub fn set_volume(&mut self, volume: f64) {
        self.media.set_volume(volume.clamp(0.0, 1.0));
    }

    /// Enter fullscreen on the container, or leave it if something is fullscreen
    pub fn toggle_fullscreen(&mut self) -> Result<FullscreenAction> {
        let host = &self.fullscreen;
        let is_fullscreen =
            first_present(&FULLSCREEN_ELEMENT, |name| host.is_present(FullscreenTarget::Document, name))
                .is_some();

        let (target, candidates) = if is_fullscreen {
            (FullscreenTarget::Document, &EXIT_FULLSCREEN)
        } else {
            (FullscreenTarget::Container, &REQUEST_FULLSCREEN)
        };

        let Some(method) = first_present(candidates, |name| host.is_present(target, name)) else {
            debug!("No fullscreen capability available");
            return Ok(FullscreenAction::Unavailable);
        };

        host.invoke(target, method)?;
        debug!(method, "Fullscreen toggled");
        Ok(if is_fullscreen {
            FullscreenAction::Exited(method)
        } else {
            FullscreenAction::Entered(method)
        })
    }
}

impl std::fmt::Debug for PlaybackBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackBridge")
            .field("paused", &self.media.is_paused())
            .field("current_time", &self.media.current_time())
            .finish()
    }
}
