//! Integration tests for Lumen Core

use lumen_core::{
    calculate_percentage, events, format_time, Control, Error, EventSender, FullscreenHost,
    FullscreenTarget, KeyValueStore, MediaElement, MediaEvent, PlaybackMode, PlayerConfig,
    PlayerController, PlayerEvent, PlayerParts, PlayerView, QualityLevel, Region, Result,
    SelectedQuality, StreamingEngine, StreamingEvent, TimeRange, UiEvent,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;
use url::Url;

// =============================================================================
// Fakes
// =============================================================================

#[derive(Debug)]
struct MediaState {
    paused: bool,
    time: f64,
    duration: f64,
    rate: f64,
    volume: f64,
    buffered: Vec<TimeRange>,
    seeks: Vec<f64>,
    play_calls: usize,
}

impl Default for MediaState {
    fn default() -> Self {
        Self {
            paused: true,
            time: 0.0,
            duration: f64::NAN,
            rate: 1.0,
            volume: 1.0,
            buffered: Vec::new(),
            seeks: Vec::new(),
            play_calls: 0,
        }
    }
}

struct FakeMedia(Rc<RefCell<MediaState>>);

impl MediaElement for FakeMedia {
    fn play(&mut self) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.paused = false;
        state.play_calls += 1;
        Ok(())
    }
    fn pause(&mut self) {
        self.0.borrow_mut().paused = true;
    }
    fn is_paused(&self) -> bool {
        self.0.borrow().paused
    }
    fn current_time(&self) -> f64 {
        self.0.borrow().time
    }
    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.0.borrow_mut();
        state.time = seconds;
        state.seeks.push(seconds);
    }
    fn duration(&self) -> f64 {
        self.0.borrow().duration
    }
    fn playback_rate(&self) -> f64 {
        self.0.borrow().rate
    }
    fn set_playback_rate(&mut self, rate: f64) {
        self.0.borrow_mut().rate = rate;
    }
    fn volume(&self) -> f64 {
        self.0.borrow().volume
    }
    fn set_volume(&mut self, volume: f64) {
        self.0.borrow_mut().volume = volume;
    }
    fn buffered(&self) -> Vec<TimeRange> {
        self.0.borrow().buffered.clone()
    }
}

#[derive(Default)]
struct FullscreenState {
    present: BTreeSet<(bool, String)>,
    invoked: Vec<String>,
}

struct FakeFullscreen(Rc<RefCell<FullscreenState>>);

impl FullscreenHost for FakeFullscreen {
    fn is_present(&self, target: FullscreenTarget, name: &str) -> bool {
        self.0
            .borrow()
            .present
            .contains(&(target == FullscreenTarget::Document, name.to_string()))
    }
    fn invoke(&self, _target: FullscreenTarget, name: &str) -> Result<()> {
        self.0.borrow_mut().invoked.push(name.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct EngineState {
    supported: bool,
    sender: Option<EventSender>,
    loaded: Option<Url>,
    attached: bool,
    level: Option<Option<usize>>,
}

struct FakeEngine(Rc<RefCell<EngineState>>);

impl StreamingEngine for FakeEngine {
    fn is_supported(&self) -> bool {
        self.0.borrow().supported
    }
    fn subscribe(&mut self, events: EventSender) {
        self.0.borrow_mut().sender = Some(events);
    }
    fn load_source(&mut self, url: &Url) -> Result<()> {
        self.0.borrow_mut().loaded = Some(url.clone());
        Ok(())
    }
    fn attach_media(&mut self) -> Result<()> {
        self.0.borrow_mut().attached = true;
        Ok(())
    }
    fn set_current_level(&mut self, level: Option<usize>) {
        self.0.borrow_mut().level = Some(level);
    }
}

struct FakeStore(Rc<RefCell<HashMap<String, String>>>);

impl KeyValueStore for FakeStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.0.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug)]
struct ViewState {
    texts: BTreeMap<Region, String>,
    controls: BTreeMap<Control, f64>,
    rendered: Vec<u32>,
    highlighted: BTreeSet<u32>,
    enabled: Vec<u32>,
}

impl Default for ViewState {
    fn default() -> Self {
        let mut controls = BTreeMap::new();
        controls.insert(Control::Speed, 1.0);
        controls.insert(Control::Volume, 100.0);
        controls.insert(Control::SeekBar, 0.0);
        Self {
            texts: BTreeMap::new(),
            controls,
            rendered: Vec::new(),
            highlighted: BTreeSet::new(),
            enabled: Vec::new(),
        }
    }
}

impl ViewState {
    fn text(&self, region: Region) -> Option<&str> {
        self.texts.get(&region).map(String::as_str)
    }
}

struct FakeView(Rc<RefCell<ViewState>>);

impl PlayerView for FakeView {
    fn set_text(&mut self, region: Region, text: &str) {
        self.0.borrow_mut().texts.insert(region, text.to_string());
    }
    fn control_value(&self, control: Control) -> f64 {
        self.0.borrow().controls.get(&control).copied().unwrap_or(0.0)
    }
    fn set_control_value(&mut self, control: Control, value: f64) {
        self.0.borrow_mut().controls.insert(control, value);
    }
    fn render_levels(&mut self, levels: &[QualityLevel]) {
        let mut state = self.0.borrow_mut();
        state.rendered = levels.iter().map(|l| l.height).collect();
        state.highlighted.clear();
    }
    fn set_level_highlight(&mut self, height: u32, highlighted: bool) {
        let mut state = self.0.borrow_mut();
        if highlighted {
            state.highlighted.insert(height);
        } else {
            state.highlighted.remove(&height);
        }
    }
    fn enable_resolution_selectors(&mut self, heights: &[u32]) {
        self.0.borrow_mut().enabled = heights.to_vec();
    }
}

struct Harness {
    media: Rc<RefCell<MediaState>>,
    fullscreen: Rc<RefCell<FullscreenState>>,
    engine: Rc<RefCell<EngineState>>,
    store: Rc<RefCell<HashMap<String, String>>>,
    view: Rc<RefCell<ViewState>>,
}

impl Harness {
    fn new() -> Self {
        Self {
            media: Rc::default(),
            fullscreen: Rc::default(),
            engine: Rc::new(RefCell::new(EngineState {
                supported: true,
                ..Default::default()
            })),
            store: Rc::default(),
            view: Rc::default(),
        }
    }

    fn with_duration(self, duration: f64) -> Self {
        self.media.borrow_mut().duration = duration;
        self
    }

    fn with_stored(self, key: &str, value: &str) -> Self {
        self.store.borrow_mut().insert(key.to_string(), value.to_string());
        self
    }

    fn parts(&self) -> PlayerParts {
        PlayerParts {
            media: Box::new(FakeMedia(self.media.clone())),
            fullscreen: Box::new(FakeFullscreen(self.fullscreen.clone())),
            engine: Box::new(FakeEngine(self.engine.clone())),
            store: Box::new(FakeStore(self.store.clone())),
            view: Box::new(FakeView(self.view.clone())),
        }
    }

    fn start(&self) -> PlayerController {
        let (tx, _rx) = events::channel();
        PlayerController::start(PlayerConfig::default(), self.parts(), tx).unwrap()
    }

    fn stored(&self, key: &str) -> Option<String> {
        self.store.borrow().get(key).cloned()
    }
}

fn ladder() -> Vec<QualityLevel> {
    vec![
        QualityLevel::new(184, 200_000).with_codecs("mp4a.40.2", "avc1,mp4a"),
        QualityLevel::new(288, 400_000),
        QualityLevel::new(480, 800_000),
        QualityLevel::new(720, 1_500_000),
        QualityLevel::new(1080, 3_000_000),
    ]
}

fn manifest(levels: Vec<QualityLevel>) -> PlayerEvent {
    StreamingEvent::ManifestParsed { levels }.into()
}

// =============================================================================
// Time Formatter Tests
// =============================================================================

#[test]
fn test_format_time_examples() {
    assert_eq!(format_time(65.0), "1:05");
    assert_eq!(format_time(5.0), "0:05");
    assert_eq!(format_time(3600.0), "60:00");
}

#[test]
fn test_format_time_shape() {
    for s in 0..4000u32 {
        let text = format_time(f64::from(s));
        let (minutes, seconds) = text.split_once(':').unwrap();
        assert_eq!(seconds.len(), 2);
        assert_eq!(minutes.parse::<u32>().unwrap(), s / 60);
        assert_eq!(seconds.parse::<u32>().unwrap(), s % 60);
    }
}

#[test]
fn test_calculate_percentage() {
    assert_eq!(calculate_percentage(30.0, 120.0), 25.0);
    assert_eq!(calculate_percentage(0.0, 120.0), 0.0);
}

// =============================================================================
// Streaming Session Tests
// =============================================================================

#[test]
fn test_start_loads_configured_source() {
    let harness = Harness::new();
    let controller = harness.start();
    let engine = harness.engine.borrow();
    assert_eq!(engine.loaded.as_ref().map(Url::as_str), Some(lumen_core::config::DEFAULT_SOURCE_URL));
    assert!(engine.attached);
    assert!(engine.sender.is_some());
    assert_eq!(controller.mode(), PlaybackMode::Paused);
    assert_eq!(harness.view.borrow().text(Region::PlayPauseLabel), Some("play"));
}

#[test]
fn test_unsupported_engine_is_fatal() {
    let harness = Harness::new();
    harness.engine.borrow_mut().supported = false;
    let (tx, _rx) = events::channel();
    let err = PlayerController::start(PlayerConfig::default(), harness.parts(), tx).unwrap_err();
    assert!(matches!(err, Error::Unsupported));
    assert!(err.is_fatal());
    assert!(harness.engine.borrow().loaded.is_none());
}

// =============================================================================
// Metadata Scenarios
// =============================================================================

#[test]
fn test_metadata_without_preferences() {
    let harness = Harness::new().with_duration(125.0);
    let mut controller = harness.start();
    controller.handle(MediaEvent::LoadedMetadata.into());

    let view = harness.view.borrow();
    assert_eq!(view.text(Region::TargetPosition), Some("2:05"));
    assert_eq!(view.text(Region::SpeedRate), Some("1"));
    assert_eq!(view.text(Region::VolumeRate), Some("100"));
    assert!(harness.media.borrow().seeks.is_empty());
}

#[test]
fn test_metadata_restores_preferences() {
    let harness = Harness::new()
        .with_duration(300.0)
        .with_stored("volume", "0.4")
        .with_stored("seekTime", "42");
    let mut controller = harness.start();
    controller.handle(MediaEvent::LoadedMetadata.into());

    let view = harness.view.borrow();
    assert_eq!(view.controls[&Control::Volume], 40.0);
    assert_eq!(view.text(Region::VolumeRate), Some("40"));
    let media = harness.media.borrow();
    assert_eq!(media.time, 42.0);
    assert_eq!(media.volume, 0.4);
}

#[test]
fn test_metadata_keeps_unrounded_volume_on_slider() {
    let harness = Harness::new()
        .with_duration(60.0)
        .with_stored("volume", "0.57");
    let mut controller = harness.start();
    controller.handle(MediaEvent::LoadedMetadata.into());

    let view = harness.view.borrow();
    // 0.57 * 100 is 56.99999999999999 in f64; only the label is rounded
    assert_eq!(view.controls[&Control::Volume], 0.57 * 100.0);
    assert_ne!(view.controls[&Control::Volume], 57.0);
    assert_eq!(view.text(Region::VolumeRate), Some("57"));
}

#[test]
fn test_metadata_applies_speed_control_value() {
    let harness = Harness::new().with_duration(60.0);
    harness.view.borrow_mut().controls.insert(Control::Speed, 1.5);
    let mut controller = harness.start();
    controller.handle(MediaEvent::LoadedMetadata.into());

    assert_eq!(harness.media.borrow().rate, 1.5);
    assert_eq!(harness.view.borrow().text(Region::SpeedRate), Some("1.5"));
}

// =============================================================================
// Continuous Sync Tests
// =============================================================================

#[test]
fn test_time_update_moves_position_and_seek_bar() {
    let harness = Harness::new().with_duration(120.0);
    harness.media.borrow_mut().time = 30.0;
    let mut controller = harness.start();
    controller.handle(MediaEvent::TimeUpdate.into());

    let view = harness.view.borrow();
    assert_eq!(view.text(Region::CurrentPosition), Some("0:30"));
    assert_eq!(view.controls[&Control::SeekBar], 25.0);
}

#[test]
fn test_progress_shows_first_range() {
    let harness = Harness::new().with_duration(200.0);
    let mut controller = harness.start();

    controller.handle(MediaEvent::Progress.into());
    assert_eq!(harness.view.borrow().text(Region::BufferSize), None);

    harness.media.borrow_mut().buffered = vec![TimeRange::new(0.0, 33.0), TimeRange::new(50.0, 60.0)];
    controller.handle(MediaEvent::Progress.into());
    assert_eq!(harness.view.borrow().text(Region::BufferSize), Some("16.50%"));

    harness.media.borrow_mut().buffered.clear();
    controller.handle(MediaEvent::Progress.into());
    assert_eq!(harness.view.borrow().text(Region::BufferSize), Some("16.50%"));
}

#[test]
fn test_segment_buffered_overwrites_stats() {
    let harness = Harness::new();
    let mut controller = harness.start();
    controller.handle(StreamingEvent::SegmentBuffered(lumen_core::BufferTelemetry {
        start: 0.0,
        end: 5.0,
        level: 4,
    }).into());
    controller.handle(StreamingEvent::SegmentBuffered(lumen_core::BufferTelemetry {
        start: 10.2,
        end: 15.2,
        level: 2,
    }).into());

    let view = harness.view.borrow();
    assert_eq!(view.text(Region::SegmentStart), Some("start:10.2"));
    assert_eq!(view.text(Region::SegmentEnd), Some("end:15.2"));
    assert_eq!(view.text(Region::SegmentLevel), Some("level:2"));
}

// =============================================================================
// Control Input Tests
// =============================================================================

#[test]
fn test_play_pause_toggle() {
    let harness = Harness::new();
    let mut controller = harness.start();

    controller.handle(UiEvent::PlayPauseClicked.into());
    assert!(!harness.media.borrow().paused);
    assert_eq!(controller.mode(), PlaybackMode::Playing);
    assert_eq!(harness.view.borrow().text(Region::PlayPauseLabel), Some("pause"));

    controller.handle(UiEvent::PlayPauseClicked.into());
    assert!(harness.media.borrow().paused);
    assert_eq!(controller.mode(), PlaybackMode::Paused);
    assert_eq!(harness.view.borrow().text(Region::PlayPauseLabel), Some("play"));
}

#[test]
fn test_volume_input_stores_fraction() {
    let harness = Harness::new();
    let mut controller = harness.start();

    for v in 0..=100u32 {
        let value = f64::from(v);
        controller.handle(UiEvent::VolumeInput { value }.into());
        let stored: f64 = harness.stored("volume").unwrap().parse().unwrap();
        assert_eq!(stored, value / 100.0);
        assert_eq!(
            harness.view.borrow().text(Region::VolumeRate),
            Some(v.to_string().as_str())
        );
    }
    assert_eq!(harness.media.borrow().volume, 1.0);
}

#[test]
fn test_seek_input_uses_duration() {
    let harness = Harness::new().with_duration(250.0);
    let mut controller = harness.start();

    for v in [0.0, 12.5, 50.0, 99.0, 100.0] {
        controller.handle(UiEvent::SeekInput { value: v }.into());
        assert_eq!(harness.media.borrow().time, v / 100.0 * 250.0);
    }
}

#[test]
fn test_seek_input_before_metadata_is_ignored() {
    let harness = Harness::new();
    let mut controller = harness.start();
    controller.handle(UiEvent::SeekInput { value: 50.0 }.into());
    assert!(harness.media.borrow().seeks.is_empty());
}

#[test]
fn test_speed_change() {
    let harness = Harness::new();
    let mut controller = harness.start();
    controller.handle(UiEvent::SpeedChanged { rate: 2.0 }.into());
    assert_eq!(harness.media.borrow().rate, 2.0);
    assert_eq!(harness.view.borrow().text(Region::SpeedRate), Some("2"));
}

#[test]
fn test_unload_persists_position() {
    let harness = Harness::new();
    harness.media.borrow_mut().time = 87.5;
    let mut controller = harness.start();
    controller.handle(UiEvent::Unload.into());
    assert_eq!(harness.stored("seekTime").as_deref(), Some("87.5"));
}

#[test]
fn test_fullscreen_click_requests_on_container() {
    let harness = Harness::new();
    harness
        .fullscreen
        .borrow_mut()
        .present
        .insert((false, "webkitRequestFullscreen".to_string()));
    let mut controller = harness.start();
    controller.handle(UiEvent::FullscreenClicked.into());
    assert_eq!(harness.fullscreen.borrow().invoked, vec!["webkitRequestFullscreen"]);
}

#[test]
fn test_fullscreen_click_without_capability() {
    let harness = Harness::new();
    let mut controller = harness.start();
    controller.handle(UiEvent::FullscreenClicked.into());
    assert!(harness.fullscreen.borrow().invoked.is_empty());
}

// =============================================================================
// Quality Selection Tests
// =============================================================================

#[test]
fn test_manifest_renders_levels_and_enables_matching_selectors() {
    let harness = Harness::new();
    let mut controller = harness.start();
    controller.handle(manifest(vec![
        QualityLevel::new(288, 400_000),
        QualityLevel::new(720, 1_500_000),
        QualityLevel::new(540, 1_000_000),
    ]));

    let view = harness.view.borrow();
    assert_eq!(view.rendered, vec![288, 720, 540]);
    assert_eq!(view.enabled, vec![288, 720]);
    assert_eq!(controller.session().levels().len(), 3);
}

#[test]
fn test_resolution_click_highlights_exactly_one() {
    let harness = Harness::new();
    harness.media.borrow_mut().time = 12.0;
    let mut controller = harness.start();
    controller.handle(manifest(ladder()));

    controller.handle(UiEvent::ResolutionClicked { height: 720 }.into());
    assert_eq!(harness.view.borrow().highlighted, BTreeSet::from([720]));
    assert_eq!(harness.engine.borrow().level, Some(Some(3)));
    assert_eq!(harness.stored("seekTime").as_deref(), Some("12"));
    assert_eq!(harness.media.borrow().play_calls, 1);

    controller.handle(UiEvent::ResolutionClicked { height: 184 }.into());
    assert_eq!(harness.view.borrow().highlighted, BTreeSet::from([184]));
    assert_eq!(controller.highlighted_level(), Some(184));
    assert_eq!(controller.session().selected(), SelectedQuality::Forced(0));

    controller.handle(UiEvent::ResolutionClicked { height: 184 }.into());
    assert_eq!(harness.view.borrow().highlighted, BTreeSet::from([184]));
    assert_eq!(controller.mode(), PlaybackMode::Playing);
}

#[test]
fn test_resolution_click_before_manifest_does_nothing() {
    let harness = Harness::new();
    let mut controller = harness.start();
    controller.handle(UiEvent::ResolutionClicked { height: 720 }.into());

    assert!(harness.view.borrow().highlighted.is_empty());
    assert!(harness.engine.borrow().level.is_none());
    assert!(harness.stored("seekTime").is_none());
}

#[test]
fn test_unknown_resolution_keeps_previous_selection() {
    let harness = Harness::new();
    let mut controller = harness.start();
    controller.handle(manifest(vec![QualityLevel::new(720, 1_500_000)]));
    controller.handle(UiEvent::ResolutionClicked { height: 720 }.into());
    controller.handle(UiEvent::ResolutionClicked { height: 1080 }.into());

    assert_eq!(harness.view.borrow().highlighted, BTreeSet::from([720]));
    assert_eq!(controller.session().selected(), SelectedQuality::Forced(0));
}

// =============================================================================
// Event Bus Tests
// =============================================================================

#[tokio::test]
async fn test_run_drains_engine_events() {
    let harness = Harness::new().with_duration(90.0);
    let (tx, rx) = events::channel();
    let controller = PlayerController::start(PlayerConfig::default(), harness.parts(), tx.clone()).unwrap();

    let engine_sender = harness.engine.borrow_mut().sender.take().unwrap();
    engine_sender.publish(StreamingEvent::ManifestParsed { levels: ladder() });
    tx.publish(MediaEvent::LoadedMetadata);
    tx.publish(UiEvent::ResolutionClicked { height: 480 });
    drop(engine_sender);
    drop(tx);

    let controller = controller.run(rx).await;
    assert_eq!(controller.highlighted_level(), Some(480));
    assert_eq!(harness.view.borrow().text(Region::TargetPosition), Some("1:30"));
}

#[test]
fn test_drain_handles_queued_events() {
    let harness = Harness::new();
    let (tx, mut rx) = events::channel();
    let mut controller = PlayerController::start(PlayerConfig::default(), harness.parts(), tx.clone()).unwrap();

    tx.publish(UiEvent::PlayPauseClicked);
    tx.publish(UiEvent::PlayPauseClicked);
    tx.publish(UiEvent::PlayPauseClicked);
    assert_eq!(controller.drain(&mut rx), 3);
    assert_eq!(controller.mode(), PlaybackMode::Playing);
}
