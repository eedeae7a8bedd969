//! hls.js engine binding
//!
//! Wraps a global `Hls` constructor and forwards its manifest and buffer
//! events onto the player's event bus.

use lumen_core::{BufferTelemetry, EventSender, QualityLevel, Result, StreamingEngine, StreamingEvent};
use serde::Deserialize;
use url::Url;
use wasm_bindgen::prelude::*;
use web_sys::HtmlMediaElement;

/// `Hls.Events.MANIFEST_PARSED`
const MANIFEST_PARSED: &str = "hlsManifestParsed";
/// `Hls.Events.BUFFER_APPENDED`
const BUFFER_APPENDED: &str = "hlsBufferAppended";

#[wasm_bindgen]
extern "C" {
    /// The hls.js player class
    pub type Hls;

    #[wasm_bindgen(static_method_of = Hls, js_name = isSupported)]
    fn is_supported() -> bool;

    #[wasm_bindgen(constructor)]
    fn new() -> Hls;

    #[wasm_bindgen(method, js_name = loadSource)]
    fn load_source(this: &Hls, url: &str);

    #[wasm_bindgen(method, js_name = attachMedia)]
    fn attach_media(this: &Hls, media: &HtmlMediaElement);

    #[wasm_bindgen(method)]
    fn on(this: &Hls, event: &str, callback: &js_sys::Function);

    #[wasm_bindgen(method, setter = currentLevel)]
    fn set_current_level(this: &Hls, level: i32);
}

#[derive(Deserialize)]
struct ManifestParsedData {
    levels: Vec<QualityLevel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferAppendedData {
    chunk_meta: ChunkMeta,
}

#[derive(Deserialize)]
struct ChunkMeta {
    level: usize,
    buffering: Buffering,
}

#[derive(Deserialize)]
struct Buffering {
    video: BufferingRange,
}

#[derive(Deserialize)]
struct BufferingRange {
    start: f64,
    end: f64,
}

impl From<BufferAppendedData> for BufferTelemetry {
    fn from(data: BufferAppendedData) -> Self {
        BufferTelemetry {
            start: data.chunk_meta.buffering.video.start,
            end: data.chunk_meta.buffering.video.end,
            level: data.chunk_meta.level,
        }
    }
}

/// [`StreamingEngine`] backed by hls.js
pub struct HlsEngine {
    media: HtmlMediaElement,
    hls: Option<Hls>,
}

impl HlsEngine {
    pub fn new(media: HtmlMediaElement) -> Self {
        Self { media, hls: None }
    }

    fn hls(&mut self) -> &Hls {
        self.hls.get_or_insert_with(Hls::new)
    }
}

impl StreamingEngine for HlsEngine {
    fn is_supported(&self) -> bool {
        // a missing script throws on the static call
        let defined = js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("Hls")).unwrap_or(false);
        defined && Hls::is_supported()
    }

    fn subscribe(&mut self, events: EventSender) {
        let manifest_events = events.clone();
        let on_manifest = Closure::<dyn Fn(JsValue, JsValue)>::new(move |_event: JsValue, data: JsValue| {
            match serde_wasm_bindgen::from_value::<ManifestParsedData>(data) {
                Ok(parsed) => manifest_events.publish(StreamingEvent::ManifestParsed { levels: parsed.levels }),
                Err(err) => tracing::warn!(error = %err, "Unreadable manifest event"),
            }
        });

        let on_buffer = Closure::<dyn Fn(JsValue, JsValue)>::new(move |_event: JsValue, data: JsValue| {
            // chunks without video buffering info carry no telemetry
            if let Ok(appended) = serde_wasm_bindgen::from_value::<BufferAppendedData>(data) {
                events.publish(StreamingEvent::SegmentBuffered(appended.into()));
            }
        });

        let hls = self.hls();
        hls.on(MANIFEST_PARSED, on_manifest.as_ref().unchecked_ref());
        hls.on(BUFFER_APPENDED, on_buffer.as_ref().unchecked_ref());

        // listeners live as long as the page
        on_manifest.forget();
        on_buffer.forget();
    }

    fn load_source(&mut self, url: &Url) -> Result<()> {
        self.hls().load_source(url.as_str());
        Ok(())
    }

    fn attach_media(&mut self) -> Result<()> {
        let media = self.media.clone();
        self.hls().attach_media(&media);
        Ok(())
    }

    fn set_current_level(&mut self, level: Option<usize>) {
        let index = level.map_or(-1, |i| i as i32);
        self.hls().set_current_level(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_levels_decode() {
        let json = r#"{
            "levels": [
                {"height": 288, "bitrate": 400000, "codecSet": "avc1", "width": 512, "url": ["a.m3u8"]},
                {"height": 720, "bitrate": 1500000, "audioCodec": "mp4a.40.2", "codecSet": "avc1"}
            ],
            "firstLevel": 0
        }"#;
        let parsed: ManifestParsedData = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.levels.len(), 2);
        let low = &parsed.levels[0];
        assert_eq!(low.height, 288);
        assert_eq!(low.audio_codec, None);
        assert_eq!(low.stats_fields()[0], ("audioCodec", "undefined".to_string()));
        assert_eq!(parsed.levels[1].audio_codec.as_deref(), Some("mp4a.40.2"));
    }

    #[test]
    fn test_buffer_appended_to_telemetry() {
        let json = r#"{
            "type": "video",
            "chunkMeta": {"level": 2, "sn": 7, "buffering": {"video": {"start": 10.2, "end": 15.2}}}
        }"#;
        let appended: BufferAppendedData = serde_json::from_str(json).unwrap();

        assert_eq!(
            BufferTelemetry::from(appended),
            BufferTelemetry { start: 10.2, end: 15.2, level: 2 }
        );
    }

    #[test]
    fn test_buffer_appended_without_video_is_skipped() {
        let audio_only = r#"{"chunkMeta": {"level": 1, "buffering": {"audio": {"start": 0, "end": 4}}}}"#;
        assert!(serde_json::from_str::<BufferAppendedData>(audio_only).is_err());

        let no_chunk = r#"{"type": "audio"}"#;
        assert!(serde_json::from_str::<BufferAppendedData>(no_chunk).is_err());
    }
}
