//! Audio-related small types and handles.
//!
//! This module defines the commands sent to the audio thread, the events it
//! sends back and the shared playback info handle.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::session::PrimitiveEvent;

#[derive(Debug)]
pub(super) enum AudioCmd {
    /// Replace the current source. `generation` tags every event about it.
    Load { source: PathBuf, generation: u64 },
    /// Resume output.
    Play,
    /// Pause output.
    Pause,
    /// Set the gain of the current and future sinks.
    SetVolume(f32),
    /// Jump to an absolute position of the current source. Events from
    /// before the jump carry an older `generation`.
    SetPosition { position: Duration, generation: u64 },
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// An event from the audio thread, tagged with the load it belongs to.
#[derive(Debug)]
pub(super) struct AudioEvent {
    pub generation: u64,
    pub event: PrimitiveEvent,
}

#[derive(Debug, Clone, Default)]
/// Source information published by the audio thread.
pub(super) struct PlaybackInfo {
    /// Load the fields below describe.
    pub load_generation: u64,
    /// Total length of the current source, when known.
    pub total: Option<Duration>,
}

pub(super) type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open {path}, {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("failed to decode {path}, {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("no audio output device, {0}")]
    NoOutputDevice(String),
}
