//! `window.localStorage` preference backend

use lumen_core::{Error, KeyValueStore, Result};
use web_sys::Storage;

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// `None` when storage is disabled (private mode, sandboxed frames)
    pub fn from_window(window: &web_sys::Window) -> Option<Self> {
        window
            .local_storage()
            .ok()
            .flatten()
            .map(|storage| Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|err| Error::Storage(format!("{err:?}")))
    }
}
