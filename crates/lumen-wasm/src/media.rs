//! `HTMLMediaElement` adapter and native media event forwarding

use lumen_core::{Error, EventSender, MediaElement, MediaEvent, Result, TimeRange};
use wasm_bindgen::prelude::*;
use web_sys::HtmlMediaElement;

/// [`MediaElement`] over the page's `<video>`
pub struct DomMedia {
    element: HtmlMediaElement,
}

impl DomMedia {
    pub fn new(element: HtmlMediaElement) -> Self {
        Self { element }
    }
}

/// Publish `loadedmetadata`, `timeupdate` and `progress` on the bus
pub fn forward_events(element: &HtmlMediaElement, events: &EventSender) -> std::result::Result<(), JsValue> {
    for (name, event) in [
        ("loadedmetadata", MediaEvent::LoadedMetadata),
        ("timeupdate", MediaEvent::TimeUpdate),
        ("progress", MediaEvent::Progress),
    ] {
        let events = events.clone();
        let callback = Closure::<dyn Fn(web_sys::Event)>::new(move |_: web_sys::Event| {
            events.publish(event);
        });
        element.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())?;
        callback.forget();
    }
    Ok(())
}

impl MediaElement for DomMedia {
    fn play(&mut self) -> Result<()> {
        // the returned promise rejects on autoplay policy; nothing to do about it here
        self.element
            .play()
            .map(|_| ())
            .map_err(|err| Error::Media(format!("{err:?}")))
    }

    fn pause(&mut self) {
        if let Err(err) = self.element.pause() {
            tracing::warn!(error = ?err, "Pause failed");
        }
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn playback_rate(&self) -> f64 {
        self.element.playback_rate()
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.element.set_playback_rate(rate);
    }

    fn volume(&self) -> f64 {
        self.element.volume()
    }

    fn set_volume(&mut self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn buffered(&self) -> Vec<TimeRange> {
        let ranges = self.element.buffered();
        (0..ranges.length())
            .filter_map(|i| {
                let start = ranges.start(i).ok()?;
                let end = ranges.end(i).ok()?;
                Some(TimeRange::new(start, end))
            })
            .collect()
    }
}
