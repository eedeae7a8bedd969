//! Streaming Session - owns the adaptive streaming engine
//!
//! Coordinates:
//! - Capability probe and manifest load
//! - Media attach
//! - Quality level bookkeeping after manifest parse
//! - Forced level selection and return to automatic

use crate::{
    events::EventSender,
    types::{QualityLevel, SelectedQuality, SessionId},
    Error, Result,
};
use tracing::{error, info, instrument};
use url::Url;

/// Adaptive streaming engine (hls.js in the browser)
///
/// Implementations publish `StreamingEvent::ManifestParsed` and
/// `StreamingEvent::SegmentBuffered` on the sender given to `subscribe`.
pub trait StreamingEngine {
    /// Whether the engine can run in this environment
    fn is_supported(&self) -> bool;
    fn subscribe(&mut self, events: EventSender);
    fn load_source(&mut self, url: &Url) -> Result<()>;
    /// Route engine output to the media element
    fn attach_media(&mut self) -> Result<()>;
    /// `None` hands level choice back to the engine's ABR
    fn set_current_level(&mut self, level: Option<usize>);
}

/// Streaming session managing a single source
pub struct StreamingSession {
    /// Unique session ID
    id: SessionId,
    /// Engine instance
    engine: Box<dyn StreamingEngine>,
    /// Loaded source
    source: Url,
    /// Levels in engine order, once the manifest is parsed
    levels: Option<Vec<QualityLevel>>,
    /// Currently forced level
    selected: SelectedQuality,
}

impl StreamingSession {
    /// Create the session, load `source` and attach the media element.
    ///
    /// Fails with [`Error::Unsupported`] when the engine cannot run here; in
    /// that case nothing is loaded.
    #[instrument(skip_all, fields(source = %source))]
    pub fn initialize(
        mut engine: Box<dyn StreamingEngine>,
        source: Url,
        events: EventSender,
    ) -> Result<Self> {
        if !engine.is_supported() {
            error!("Streaming engine is not supported");
            return Err(Error::Unsupported);
        }

        let id = SessionId::new();
        engine.subscribe(events);
        engine.load_source(&source)?;
        engine.attach_media()?;

        info!(session_id = %id, "Streaming session initialized");

        Ok(Self {
            id,
            engine,
            source,
            levels: None,
            selected: SelectedQuality::Automatic,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn source(&self) -> &Url {
        &self.source
    }

    /// Record the levels reported by the engine
    pub fn on_manifest_parsed(&mut self, levels: Vec<QualityLevel>) {
        info!(session_id = %self.id, levels = levels.len(), "Manifest parsed");
        self.levels = Some(levels);
    }

    /// Parsed levels, empty before manifest parse
    pub fn levels(&self) -> &[QualityLevel] {
        self.levels.as_deref().unwrap_or(&[])
    }

    pub fn is_manifest_parsed(&self) -> bool {
        self.levels.is_some()
    }

    pub fn selected(&self) -> SelectedQuality {
        self.selected
    }

    /// Index of the first level with this height
    pub fn level_index(&self, height: u32) -> Result<usize> {
        let levels = self.levels.as_ref().ok_or(Error::ManifestNotParsed)?;
        levels
            .iter()
            .position(|level| level.height == height)
            .ok_or(Error::UnknownQuality { height })
    }

    /// Force the engine to the level with this height
    pub fn select_quality(&mut self, height: u32) -> Result<usize> {
        let index = self.level_index(height)?;
        self.engine.set_current_level(Some(index));
        self.selected = SelectedQuality::Forced(index);
        info!(session_id = %self.id, height, index, "Quality level forced");
        Ok(index)
    }

    /// Clear any forced level
    pub fn set_automatic(&mut self) {
        self.engine.set_current_level(None);
        self.selected = SelectedQuality::Automatic;
        info!(session_id = %self.id, "Quality back to automatic");
    }
}

impl std::fmt::Debug for StreamingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingSession")
            .field("id", &self.id)
            .field("source", &self.source.as_str())
            .field("levels", &self.levels)
            .field("selected", &self.selected)
            .finish()
    }
}
