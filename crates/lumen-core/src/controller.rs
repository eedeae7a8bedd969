//! Player Controller - composition root
//!
//! Binds page input to the playback bridge and streaming session, and binds
//! media and streaming events back to the view and the preference store.
//! Every handler runs to completion; the controller owns all mutable state.

use crate::{
    config::PlayerConfig,
    events::{EventReceiver, EventSender, MediaEvent, PlayerEvent, StreamingEvent, UiEvent},
    playback::{FullscreenHost, MediaElement, PlaybackBridge},
    preferences::{KeyValueStore, PreferenceStore},
    session::{StreamingEngine, StreamingSession},
    time_format::{calculate_percentage, format_time},
    types::{BufferTelemetry, PlaybackMode, QualityLevel},
    view::{Control, PlayerView, Region},
    Result,
};
use tracing::{debug, info, warn};

/// Boundary implementations the controller is assembled from
pub struct PlayerParts {
    pub media: Box<dyn MediaElement>,
    pub fullscreen: Box<dyn FullscreenHost>,
    pub engine: Box<dyn StreamingEngine>,
    pub store: Box<dyn KeyValueStore>,
    pub view: Box<dyn PlayerView>,
}

/// UI controller for one player instance
pub struct PlayerController {
    config: PlayerConfig,
    bridge: PlaybackBridge,
    session: StreamingSession,
    prefs: PreferenceStore,
    view: Box<dyn PlayerView>,
    mode: PlaybackMode,
    /// Height of the level block currently highlighted
    highlighted: Option<u32>,
}

impl PlayerController {
    /// Start streaming `config.source_url` and build the controller.
    ///
    /// Returns [`crate::Error::Unsupported`] when the engine cannot run; the page then
    /// stays inert.
    pub fn start(config: PlayerConfig, parts: PlayerParts, events: EventSender) -> Result<Self> {
        config.validate()?;

        let session = StreamingSession::initialize(parts.engine, config.source_url.clone(), events)?;
        let prefs = PreferenceStore::new(parts.store, &config.volume_key, &config.position_key);
        let mut view = parts.view;
        let mode = PlaybackMode::default();
        view.set_text(Region::PlayPauseLabel, mode.button_label());

        Ok(Self {
            config,
            bridge: PlaybackBridge::new(parts.media, parts.fullscreen),
            session,
            prefs,
            view,
            mode,
            highlighted: None,
        })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn session(&self) -> &StreamingSession {
        &self.session
    }

    pub fn bridge(&self) -> &PlaybackBridge {
        &self.bridge
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Height of the highlighted level block, if any
    pub fn highlighted_level(&self) -> Option<u32> {
        self.highlighted
    }

    /// Handle events until every sender is dropped
    pub async fn run(mut self, mut events: EventReceiver) -> Self {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        info!(session_id = %self.session.id(), "Event bus closed");
        self
    }

    /// Handle everything already queued without waiting
    pub fn drain(&mut self, events: &mut EventReceiver) -> usize {
        let mut handled = 0;
        while let Some(event) = events.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Dispatch a single event
    pub fn handle(&mut self, event: PlayerEvent) {
        debug!(?event, "Handling event");
        let result = match event {
            PlayerEvent::Media(MediaEvent::LoadedMetadata) => self.on_loaded_metadata(),
            PlayerEvent::Media(MediaEvent::TimeUpdate) => {
                self.on_time_update();
                Ok(())
            }
            PlayerEvent::Media(MediaEvent::Progress) => {
                self.on_progress();
                Ok(())
            }
            PlayerEvent::Streaming(StreamingEvent::ManifestParsed { levels }) => {
                self.on_manifest_parsed(levels);
                Ok(())
            }
            PlayerEvent::Streaming(StreamingEvent::SegmentBuffered(telemetry)) => {
                self.on_segment_buffered(telemetry);
                Ok(())
            }
            PlayerEvent::Ui(UiEvent::PlayPauseClicked) => self.toggle_play_pause(),
            PlayerEvent::Ui(UiEvent::FullscreenClicked) => self.bridge.toggle_fullscreen().map(|_| ()),
            PlayerEvent::Ui(UiEvent::SpeedChanged { rate }) => {
                self.on_speed_changed(rate);
                Ok(())
            }
            PlayerEvent::Ui(UiEvent::VolumeInput { value }) => self.on_volume_input(value),
            PlayerEvent::Ui(UiEvent::SeekInput { value }) => self.on_seek_input(value),
            PlayerEvent::Ui(UiEvent::ResolutionClicked { height }) => self.on_resolution_clicked(height),
            PlayerEvent::Ui(UiEvent::Unload) => self.persist_position(),
        };

        if let Err(err) = result {
            warn!(code = err.error_code(), error = %err, "Event handling failed");
        }
    }

    fn on_loaded_metadata(&mut self) -> Result<()> {
        let duration = self.bridge.duration();
        self.view.set_text(Region::TargetPosition, &format_time(duration));

        let rate = self.view.control_value(Control::Speed);
        self.bridge.set_rate(rate);
        self.view.set_text(Region::SpeedRate, &rate.to_string());

        match self.prefs.volume() {
            Some(volume) => {
                self.bridge.set_volume(volume);
                let percent = volume * 100.0;
                self.view.set_control_value(Control::Volume, percent);
                self.view.set_text(Region::VolumeRate, &whole(percent));
            }
            None => {
                let percent = self.view.control_value(Control::Volume);
                self.view.set_text(Region::VolumeRate, &percent.to_string());
            }
        }

        if let Some(position) = self.prefs.last_position() {
            debug!(position, "Restoring last position");
            self.bridge.seek_to(position);
        }

        info!(duration, rate, "Metadata loaded");
        Ok(())
    }

    fn on_time_update(&mut self) {
        let current = self.bridge.current_time();
        self.view.set_text(Region::CurrentPosition, &format_time(current));
        if let Some(duration) = self.bridge.known_duration() {
            self.view
                .set_control_value(Control::SeekBar, calculate_percentage(current, duration));
        }
    }

    fn on_progress(&mut self) {
        let Some(duration) = self.bridge.known_duration() else {
            return;
        };
        if let Some(first) = self.bridge.buffered_ranges().first() {
            let loaded = first.end / duration * 100.0;
            self.view.set_text(Region::BufferSize, &format!("{loaded:.2}%"));
        }
    }

    fn on_manifest_parsed(&mut self, levels: Vec<QualityLevel>) {
        self.view.render_levels(&levels);
        // re-render drops any previous highlight
        self.highlighted = None;

        let available: Vec<u32> = self
            .config
            .preset_heights()
            .into_iter()
            .filter(|height| levels.iter().any(|level| level.height == *height))
            .collect();
        self.view.enable_resolution_selectors(&available);

        self.session.on_manifest_parsed(levels);
    }

    fn on_segment_buffered(&mut self, telemetry: BufferTelemetry) {
        self.view.set_text(Region::SegmentStart, &format!("start:{}", telemetry.start));
        self.view.set_text(Region::SegmentEnd, &format!("end:{}", telemetry.end));
        self.view.set_text(Region::SegmentLevel, &format!("level:{}", telemetry.level));
    }

    fn toggle_play_pause(&mut self) -> Result<()> {
        if self.bridge.is_paused() {
            self.set_mode(PlaybackMode::Playing);
            self.bridge.play()
        } else {
            self.set_mode(PlaybackMode::Paused);
            self.bridge.pause();
            Ok(())
        }
    }

    fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
        self.view.set_text(Region::PlayPauseLabel, mode.button_label());
    }

    fn on_speed_changed(&mut self, rate: f64) {
        self.bridge.set_rate(rate);
        let applied = self.bridge.playback_rate();
        self.view.set_text(Region::SpeedRate, &applied.to_string());
    }

    fn on_volume_input(&mut self, value: f64) -> Result<()> {
        let volume = value / 100.0;
        self.bridge.set_volume(volume);
        self.view.set_text(Region::VolumeRate, &whole(volume * 100.0));
        self.prefs.set_volume(volume)
    }

    fn on_seek_input(&mut self, value: f64) -> Result<()> {
        let target = self.bridge.seek_to_fraction(value / 100.0)?;
        debug!(target, "Seek bar moved");
        Ok(())
    }

    fn on_resolution_clicked(&mut self, height: u32) -> Result<()> {
        if !self.session.is_manifest_parsed() {
            debug!(height, "Resolution selectors not bound yet");
            return Ok(());
        }
        // reject unknown heights before touching any state
        self.session.level_index(height)?;

        // switching reloads the media pipeline, keep the position
        self.persist_position()?;

        if let Some(previous) = self.highlighted.take() {
            self.view.set_level_highlight(previous, false);
        }
        self.view.set_level_highlight(height, true);
        self.highlighted = Some(height);

        self.session.select_quality(height)?;
        self.set_mode(PlaybackMode::Playing);
        self.bridge.play()
    }

    fn persist_position(&mut self) -> Result<()> {
        let position = self.bridge.current_time();
        self.prefs.set_last_position(position)
    }
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("session", &self.session)
            .field("bridge", &self.bridge)
            .field("mode", &self.mode)
            .field("highlighted", &self.highlighted)
            .finish()
    }
}

/// Whole-number display of a percentage
fn whole(value: f64) -> String {
    format!("{}", value.round() as i64)
}
