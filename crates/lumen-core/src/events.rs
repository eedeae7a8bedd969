//! Event bus between the page, the media element, the streaming engine and
//! the controller.
//!
//! Every source holds a cloned [`EventSender`] and publishes directly; the
//! controller owns the single [`EventReceiver`] and handles events one at a
//! time, in publish order.

use crate::types::{BufferTelemetry, QualityLevel};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events raised by the native media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MediaEvent {
    LoadedMetadata,
    TimeUpdate,
    Progress,
}

/// Events raised by the streaming engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamingEvent {
    /// Manifest parsed; levels in engine order
    ManifestParsed { levels: Vec<QualityLevel> },
    /// A media segment was appended to the buffer
    SegmentBuffered(BufferTelemetry),
}

/// User input on the page controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiEvent {
    PlayPauseClicked,
    FullscreenClicked,
    /// Speed selector changed to this rate
    SpeedChanged { rate: f64 },
    /// Volume slider moved, raw value 0-100
    VolumeInput { value: f64 },
    /// Seek bar moved, raw value 0-100
    SeekInput { value: f64 },
    /// Resolution selector for this height clicked
    ResolutionClicked { height: u32 },
    /// Page is being unloaded
    Unload,
}

/// Anything the controller reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "event", rename_all = "camelCase")]
pub enum PlayerEvent {
    Media(MediaEvent),
    Streaming(StreamingEvent),
    Ui(UiEvent),
}

impl From<MediaEvent> for PlayerEvent {
    fn from(event: MediaEvent) -> Self {
        PlayerEvent::Media(event)
    }
}

impl From<StreamingEvent> for PlayerEvent {
    fn from(event: StreamingEvent) -> Self {
        PlayerEvent::Streaming(event)
    }
}

impl From<UiEvent> for PlayerEvent {
    fn from(event: UiEvent) -> Self {
        PlayerEvent::Ui(event)
    }
}

/// Create a connected sender/receiver pair
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

/// Publishing half of the bus. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<PlayerEvent>,
}

impl EventSender {
    /// Publish an event. Sync; events published after the receiver is gone
    /// are dropped.
    pub fn publish<E: Into<PlayerEvent>>(&self, event: E) {
        if self.tx.send(event.into()).is_err() {
            tracing::debug!("Event dropped, controller is gone");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consuming half of the bus, owned by the controller's loop
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<PlayerEvent>,
}

impl EventReceiver {
    /// Wait for the next event; `None` once every sender is dropped
    pub async fn recv(&mut self) -> Option<PlayerEvent> {
        self.rx.recv().await
    }

    /// Next already-queued event, if any
    pub fn try_recv(&mut self) -> Option<PlayerEvent> {
        self.rx.try_recv().ok()
    }
}
