//! Lumen WASM - browser entry point for the Lumen player
//!
//! Binds the page's `<video>`, controls, `localStorage` and hls.js to the
//! [`lumen_core::PlayerController`].
//!
//! ## Usage
//!
//! ```javascript
//! import init, { startPlayer } from '@lumen/wasm';
//!
//! await init();
//! startPlayer(); // or startPlayer(JSON.stringify({ sourceUrl: '...' }))
//! ```

use lumen_core::{events, KeyValueStore, MemoryStore, PlayerConfig, PlayerController, PlayerParts};
use wasm_bindgen::prelude::*;

mod dom_view;
mod fullscreen;
mod hls;
mod media;
mod storage;

pub use dom_view::DomView;
pub use fullscreen::DomFullscreen;
pub use hls::HlsEngine;
pub use media::DomMedia;
pub use storage::LocalStorage;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    web_sys::console::log_1(&"[Lumen WASM] Initialized".into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    lumen_core::VERSION.to_string()
}

/// `M:SS` display of a time in seconds
#[wasm_bindgen(js_name = formatTime)]
pub fn format_time(seconds: f64) -> String {
    lumen_core::format_time(seconds)
}

/// Wire the page and start playback of the configured source.
///
/// `config_json` may override any [`PlayerConfig`] field. When hls.js cannot
/// run, a console error is printed and the page stays inert.
#[wasm_bindgen(js_name = startPlayer)]
pub fn start_player(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(json) => PlayerConfig::from_json(&json).map_err(to_js)?,
        None => PlayerConfig::default(),
    };

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let video: web_sys::HtmlMediaElement = dom_view::find(&document, "#video")?.dyn_into()?;
    let container = dom_view::find(&document, ".video-container")?;

    let store: Box<dyn KeyValueStore> = match LocalStorage::from_window(&window) {
        Some(storage) => Box::new(storage),
        None => {
            tracing::warn!("localStorage unavailable, preferences will not persist");
            Box::new(MemoryStore::new())
        }
    };

    let (sender, receiver) = events::channel();
    let resolution_presets = config.resolution_presets.clone();

    let parts = PlayerParts {
        media: Box::new(DomMedia::new(video.clone())),
        fullscreen: Box::new(DomFullscreen::new(document.clone(), container)),
        engine: Box::new(HlsEngine::new(video.clone())),
        store,
        view: Box::new(DomView::new(document.clone(), &config)?),
    };

    let controller = match PlayerController::start(config, parts, sender.clone()) {
        Ok(controller) => controller,
        Err(err) if err.is_fatal() => {
            web_sys::console::error_1(&"HLS.js is not supported".into());
            return Ok(());
        }
        Err(err) => return Err(to_js(err)),
    };

    media::forward_events(&video, &sender)?;
    dom_view::forward_input(&document, &resolution_presets, &sender)?;

    wasm_bindgen_futures::spawn_local(async move {
        controller.run(receiver).await;
    });

    Ok(())
}

fn to_js(err: lumen_core::Error) -> JsValue {
    JsValue::from_str(&format!("[{}] {}", err.error_code(), err))
}
