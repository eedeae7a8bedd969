//! DOM rendering of the player page and control input forwarding
//!
//! Element ids and classes are the page's fixed markup contract.

use js_sys::Reflect;
use lumen_core::{Control, EventSender, PlayerConfig, PlayerView, QualityLevel, Region, ResolutionPreset, UiEvent};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

/// CSS selector of each display region on the page
fn region_selector(region: Region) -> &'static str {
    match region {
        Region::CurrentPosition => "#currentPosition",
        Region::TargetPosition => "#targetPosition",
        Region::SpeedRate => "#speedRate",
        Region::VolumeRate => "#volumeRate",
        Region::BufferSize => "#bufferSize",
        Region::SegmentStart => ".size-start",
        Region::SegmentEnd => ".size-end",
        Region::SegmentLevel => ".level",
        Region::PlayPauseLabel => "#playPauseButton",
    }
}

const STATS_SELECTOR: &str = ".video-stats";

/// Look up a required element
pub fn find(document: &Document, selector: &str) -> Result<Element, JsValue> {
    document
        .query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("missing element {selector}")))
}

/// [`PlayerView`] writing into the page's fixed elements
pub struct DomView {
    document: Document,
    regions: HashMap<Region, Element>,
    controls: HashMap<Control, Element>,
    selectors: Vec<(u32, Element)>,
    stats: Element,
    highlight_class: String,
}

impl DomView {
    pub fn new(document: Document, config: &PlayerConfig) -> Result<Self, JsValue> {
        let mut regions = HashMap::new();
        for region in Region::ALL {
            regions.insert(region, find(&document, region_selector(region))?);
        }

        let mut controls = HashMap::new();
        for control in [Control::SeekBar, Control::Volume, Control::Speed] {
            controls.insert(control, find(&document, &format!("#{}", control.name()))?);
        }

        let selectors = config
            .resolution_presets
            .iter()
            .map(|preset| Ok((preset.height, find(&document, &format!("#{}", preset.control))?)))
            .collect::<Result<Vec<_>, JsValue>>()?;

        let stats = find(&document, STATS_SELECTOR)?;

        Ok(Self {
            document,
            regions,
            controls,
            selectors,
            stats,
            highlight_class: config.highlight_class.clone(),
        })
    }

    fn level_block(&self, height: u32) -> Option<Element> {
        self.stats
            .query_selector(&format!(".resolution-{height}"))
            .ok()
            .flatten()
    }

    fn build_level_block(&self, level: &QualityLevel) -> Result<Element, JsValue> {
        let block = self.document.create_element("div")?;
        block.set_class_name(&level.css_class());
        for (label, value) in level.stats_fields() {
            let strong = self.document.create_element("strong")?;
            strong.set_text_content(Some(label));
            block.append_child(&strong)?;
            let text = self.document.create_text_node(&format!(" {value} "));
            block.append_child(&text)?;
        }
        Ok(block)
    }
}

/// Publish clicks and input on every page control as [`UiEvent`]s
pub fn forward_input(
    document: &Document,
    presets: &[ResolutionPreset],
    events: &EventSender,
) -> Result<(), JsValue> {
    let button = |selector: &str, event: UiEvent| -> Result<(), JsValue> {
        listen(&find(document, selector)?, "click", events, move |_| Some(event))
    };
    button("#playPauseButton", UiEvent::PlayPauseClicked)?;
    button("#fullscreenButton", UiEvent::FullscreenClicked)?;

    let control = |control: Control| find(document, &format!("#{}", control.name()));
    listen(&control(Control::Speed)?, "change", events, |target| {
        read_value(target).map(|rate| UiEvent::SpeedChanged { rate })
    })?;
    listen(&control(Control::Volume)?, "input", events, |target| {
        read_value(target).map(|value| UiEvent::VolumeInput { value })
    })?;
    listen(&control(Control::SeekBar)?, "input", events, |target| {
        read_value(target).map(|value| UiEvent::SeekInput { value })
    })?;

    for preset in presets {
        let height = preset.height;
        let selector = find(document, &format!("#{}", preset.control))?;
        listen(&selector, "click", events, move |_| Some(UiEvent::ResolutionClicked { height }))?;
    }

    let window = web_sys::window().ok_or("no window")?;
    let unload_events = events.clone();
    let on_unload = Closure::<dyn Fn(web_sys::Event)>::new(move |_: web_sys::Event| {
        unload_events.publish(UiEvent::Unload);
    });
    window.add_event_listener_with_callback("beforeunload", on_unload.as_ref().unchecked_ref())?;
    on_unload.forget();

    Ok(())
}

/// Listen for `event` on `element`, publishing whatever `map` derives from it
fn listen(
    element: &Element,
    event: &str,
    events: &EventSender,
    map: impl Fn(&Element) -> Option<UiEvent> + 'static,
) -> Result<(), JsValue> {
    let events = events.clone();
    let target = element.clone();
    let callback = Closure::<dyn Fn(web_sys::Event)>::new(move |_: web_sys::Event| {
        if let Some(ui_event) = map(&target) {
            events.publish(ui_event);
        }
    });
    element.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

/// Numeric `value` of an input or select element
fn read_value(element: &Element) -> Option<f64> {
    Reflect::get(element, &JsValue::from_str("value"))
        .ok()?
        .as_string()?
        .trim()
        .parse()
        .ok()
}

impl PlayerView for DomView {
    fn set_text(&mut self, region: Region, text: &str) {
        if let Some(element) = self.regions.get(&region) {
            element.set_text_content(Some(text));
        }
    }

    fn control_value(&self, control: Control) -> f64 {
        self.controls
            .get(&control)
            .and_then(read_value)
            .unwrap_or(f64::NAN)
    }

    fn set_control_value(&mut self, control: Control, value: f64) {
        let Some(element) = self.controls.get(&control) else {
            return;
        };
        let written = Reflect::set(element, &JsValue::from_str("value"), &JsValue::from_str(&value.to_string()));
        if let Err(err) = written {
            tracing::warn!(control = control.name(), error = ?err, "Could not set control value");
        }
    }

    fn render_levels(&mut self, levels: &[QualityLevel]) {
        self.stats.set_text_content(None);
        for level in levels {
            let appended = self
                .build_level_block(level)
                .and_then(|block| self.stats.append_child(&block));
            if let Err(err) = appended {
                tracing::warn!(height = level.height, error = ?err, "Could not render level stats");
            }
        }
    }

    fn set_level_highlight(&mut self, height: u32, highlighted: bool) {
        let Some(block) = self.level_block(height) else {
            return;
        };
        let classes = block.class_list();
        let result = if highlighted {
            classes.add_1(&self.highlight_class)
        } else {
            classes.remove_1(&self.highlight_class)
        };
        if let Err(err) = result {
            tracing::warn!(height, error = ?err, "Could not toggle level highlight");
        }
    }

    fn enable_resolution_selectors(&mut self, heights: &[u32]) {
        for (height, selector) in &self.selectors {
            let result = if heights.contains(height) {
                selector.remove_attribute("disabled")
            } else {
                selector.set_attribute("disabled", "")
            };
            if let Err(err) = result {
                tracing::warn!(height, error = ?err, "Could not update resolution selector");
            }
        }
    }
}
