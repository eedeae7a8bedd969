//! Vendor-prefixed fullscreen lookups through `Reflect`

use js_sys::{Function, Reflect};
use lumen_core::{Error, FullscreenHost, FullscreenTarget, Result};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

pub struct DomFullscreen {
    document: Document,
    container: Element,
}

impl DomFullscreen {
    pub fn new(document: Document, container: Element) -> Self {
        Self { document, container }
    }

    fn target(&self, target: FullscreenTarget) -> &JsValue {
        match target {
            FullscreenTarget::Document => self.document.as_ref(),
            FullscreenTarget::Container => self.container.as_ref(),
        }
    }

    fn lookup(&self, target: FullscreenTarget, name: &str) -> Option<JsValue> {
        Reflect::get(self.target(target), &JsValue::from_str(name))
            .ok()
            .filter(|value| !value.is_null() && !value.is_undefined())
    }
}

impl FullscreenHost for DomFullscreen {
    fn is_present(&self, target: FullscreenTarget, name: &str) -> bool {
        self.lookup(target, name).is_some()
    }

    fn invoke(&self, target: FullscreenTarget, name: &str) -> Result<()> {
        let method = self
            .lookup(target, name)
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| Error::Media(format!("{name} is not callable")))?;
        // the promise some browsers return is not awaited
        method
            .call0(self.target(target))
            .map(|_| ())
            .map_err(|err| Error::Media(format!("{name} failed: {err:?}")))
    }
}
