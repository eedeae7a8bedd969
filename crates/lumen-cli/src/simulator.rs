//! Headless player: simulated media element, engine and view driven by a
//! JSON script.

use lumen_core::{
    events, BufferTelemetry, Control, EventSender, KeyValueStore, MediaElement, MediaEvent,
    NoFullscreen, PlayerConfig, PlayerController, PlayerEvent, PlayerParts, PlayerView,
    QualityLevel, Region, Result, SelectedQuality, StreamingEngine, StreamingEvent, TimeRange,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info};
use url::Url;

/// Seconds the simulated engine keeps buffered ahead of the playhead
const BUFFER_AHEAD: f64 = 30.0;

/// A scripted session
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    /// Media duration reported at metadata load
    pub duration: f64,
    /// Levels the engine reports after manifest parse
    #[serde(default)]
    pub levels: Vec<QualityLevel>,
    /// Initial speed control value
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Initial volume control value (0-100)
    #[serde(default = "default_volume")]
    pub volume: f64,
    pub steps: Vec<Step>,
}

fn default_speed() -> f64 {
    1.0
}

fn default_volume() -> f64 {
    100.0
}

/// One script step
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Let wall-clock time pass
    Advance { advance: f64 },
    /// Deliver an event as if a page source raised it
    Event(PlayerEvent),
}

/// Final state of the simulated page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub texts: BTreeMap<String, String>,
    pub controls: BTreeMap<String, f64>,
    pub levels: Vec<u32>,
    pub highlighted: Option<u32>,
    pub enabled_selectors: Vec<u32>,
    pub selected: SelectedQuality,
    pub media: MediaSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSnapshot {
    pub time: f64,
    pub paused: bool,
    pub rate: f64,
    pub volume: f64,
    pub buffered_end: f64,
}

#[derive(Debug)]
struct MediaState {
    paused: bool,
    time: f64,
    duration: f64,
    rate: f64,
    volume: f64,
    buffered_end: f64,
}

struct SimMedia(Rc<RefCell<MediaState>>);

impl MediaElement for SimMedia {
    fn play(&mut self) -> Result<()> {
        self.0.borrow_mut().paused = false;
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
        state.time = seconds.min(state.duration);
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
        let state = self.0.borrow();
        if state.buffered_end > 0.0 {
            vec![TimeRange::new(0.0, state.buffered_end)]
        } else {
            Vec::new()
        }
    }
}

#[derive(Default)]
struct EngineState {
    levels: Vec<QualityLevel>,
    sender: Option<EventSender>,
    current_level: Option<usize>,
}

struct SimEngine(Rc<RefCell<EngineState>>);

impl StreamingEngine for SimEngine {
    fn is_supported(&self) -> bool {
        true
    }
    fn subscribe(&mut self, events: EventSender) {
        self.0.borrow_mut().sender = Some(events);
    }
    fn load_source(&mut self, url: &Url) -> Result<()> {
        info!(url = %url, "Simulated engine loading");
        Ok(())
    }
    fn attach_media(&mut self) -> Result<()> {
        let state = self.0.borrow();
        if let Some(sender) = &state.sender {
            sender.publish(StreamingEvent::ManifestParsed {
                levels: state.levels.clone(),
            });
        }
        Ok(())
    }
    fn set_current_level(&mut self, level: Option<usize>) {
        self.0.borrow_mut().current_level = level;
    }
}

#[derive(Debug, Default)]
struct ViewState {
    texts: BTreeMap<Region, String>,
    controls: BTreeMap<Control, f64>,
    levels: Vec<u32>,
    highlighted: Vec<u32>,
    enabled: Vec<u32>,
}

struct RecordingView(Rc<RefCell<ViewState>>);

impl PlayerView for RecordingView {
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
        state.levels = levels.iter().map(|level| level.height).collect();
        state.highlighted.clear();
    }
    fn set_level_highlight(&mut self, height: u32, highlighted: bool) {
        let mut state = self.0.borrow_mut();
        state.highlighted.retain(|h| *h != height);
        if highlighted {
            state.highlighted.push(height);
        }
    }
    fn enable_resolution_selectors(&mut self, heights: &[u32]) {
        self.0.borrow_mut().enabled = heights.to_vec();
    }
}

/// Run `script` to completion and return the final page state
pub fn run_script(config: PlayerConfig, script: &Script, store: Box<dyn KeyValueStore>) -> Result<Snapshot> {
    let media = Rc::new(RefCell::new(MediaState {
        paused: true,
        time: 0.0,
        duration: script.duration,
        rate: 1.0,
        volume: 1.0,
        buffered_end: 0.0,
    }));
    let engine = Rc::new(RefCell::new(EngineState {
        levels: script.levels.clone(),
        ..Default::default()
    }));
    let view = Rc::new(RefCell::new(ViewState::default()));
    {
        let mut view = view.borrow_mut();
        view.controls.insert(Control::Speed, script.speed);
        view.controls.insert(Control::Volume, script.volume);
        view.controls.insert(Control::SeekBar, 0.0);
    }

    let parts = PlayerParts {
        media: Box::new(SimMedia(media.clone())),
        fullscreen: Box::new(NoFullscreen),
        engine: Box::new(SimEngine(engine.clone())),
        store,
        view: Box::new(RecordingView(view.clone())),
    };

    let (sender, mut receiver) = events::channel();
    let mut controller = PlayerController::start(config, parts, sender.clone())?;
    sender.publish(MediaEvent::LoadedMetadata);
    controller.drain(&mut receiver);

    for step in &script.steps {
        match step {
            Step::Advance { advance } => {
                advance_playback(&media, &engine, &sender, *advance);
            }
            Step::Event(event) => sender.publish(event.clone()),
        }
        let handled = controller.drain(&mut receiver);
        debug!(?step, handled, "Step done");
    }

    let view = view.borrow();
    let media = media.borrow();
    Ok(Snapshot {
        texts: view
            .texts
            .iter()
            .map(|(region, text)| (region.name().to_string(), text.clone()))
            .collect(),
        controls: view
            .controls
            .iter()
            .map(|(control, value)| (control.name().to_string(), *value))
            .collect(),
        levels: view.levels.clone(),
        highlighted: view.highlighted.last().copied(),
        enabled_selectors: view.enabled.clone(),
        selected: controller.session().selected(),
        media: MediaSnapshot {
            time: media.time,
            paused: media.paused,
            rate: media.rate,
            volume: media.volume,
            buffered_end: media.buffered_end,
        },
    })
}

/// Move the playhead, extend the buffer and publish what the page would see
fn advance_playback(
    media: &Rc<RefCell<MediaState>>,
    engine: &Rc<RefCell<EngineState>>,
    sender: &EventSender,
    seconds: f64,
) {
    let (segment, duration) = {
        let mut state = media.borrow_mut();
        if !state.paused {
            state.time = (state.time + seconds * state.rate).min(state.duration);
        }
        let start = state.buffered_end;
        state.buffered_end = (state.time + BUFFER_AHEAD).min(state.duration);
        ((start < state.buffered_end).then_some((start, state.buffered_end)), state.duration)
    };

    sender.publish(MediaEvent::TimeUpdate);
    sender.publish(MediaEvent::Progress);

    if let Some((start, end)) = segment {
        let level = engine.borrow().current_level.unwrap_or(0);
        sender.publish(StreamingEvent::SegmentBuffered(BufferTelemetry { start, end, level }));
    }
    debug!(seconds, duration, "Playback advanced");
}
