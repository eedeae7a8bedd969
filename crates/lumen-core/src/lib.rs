//! Lumen Core - control layer for the Lumen web player
//!
//! This crate wires a native media element and page controls to an adaptive
//! streaming engine:
//! - Playback bridge over the media element, with fullscreen capability probing
//! - Streaming session owning the engine and its quality levels
//! - Preference store for volume and last position
//! - Time display helpers
//! - Player controller reacting to UI, media and streaming events
//!
//! Manifest parsing, segment fetching and ABR stay inside the engine.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         Lumen Core                            │
//! ├───────────────────────────────────────────────────────────────┤
//! │   UI events      media events      streaming events           │
//! │        └───────────────┼───────────────┘                      │
//! │                  ┌─────┴─────┐                                │
//! │                  │ Event Bus │                                │
//! │                  └─────┬─────┘                                │
//! │                  ┌─────┴──────┐                               │
//! │                  │   Player   │──────────► PlayerView         │
//! │                  │ Controller │                               │
//! │                  └──┬──────┬──┘                               │
//! │        ┌────────────┘      └─────────────┐                    │
//! │  ┌─────┴──────┐  ┌──────────────┐  ┌─────┴──────┐             │
//! │  │  Playback  │  │  Preference  │  │ Streaming  │             │
//! │  │   Bridge   │  │    Store     │  │  Session   │             │
//! │  └────────────┘  └──────────────┘  └────────────┘             │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod playback;
pub mod preferences;
pub mod session;
pub mod time_format;
pub mod types;
pub mod view;

pub use config::{PlayerConfig, ResolutionPreset};
pub use controller::{PlayerController, PlayerParts};
pub use error::{Error, Result};
pub use events::{EventReceiver, EventSender, MediaEvent, PlayerEvent, StreamingEvent, UiEvent};
pub use playback::{FullscreenAction, FullscreenHost, FullscreenTarget, MediaElement, NoFullscreen, PlaybackBridge};
pub use preferences::{KeyValueStore, MemoryStore, PreferenceStore};
pub use session::{StreamingEngine, StreamingSession};
pub use time_format::{calculate_percentage, format_time};
pub use types::*;
pub use view::{Control, PlayerView, Region};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
