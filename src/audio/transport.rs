//! Playback bookkeeping of the audio thread, kept apart from the rodio sink.
//!
//! `Transport` decides when a sink must be rebuilt and which events a tick
//! reports; `AudioThread` carries those decisions out on the real sink.

use std::path::PathBuf;
use std::time::Duration;

use crate::session::PrimitiveEvent;

#[derive(Debug, Default)]
pub(super) struct Transport {
    /// Tag of every event emitted; bumped by loads and seeks.
    pub generation: u64,
    /// Generation of the last load. `total` belongs to it.
    pub load_generation: u64,
    pub source: Option<PathBuf>,
    pub total: Option<Duration>,
    /// Requested output state; survives source changes.
    pub paused: bool,
    /// The sink drained and `Ended` was reported for this load.
    pub ended: bool,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            paused: true,
            ..Self::default()
        }
    }

    /// Adopt a new source. The caller rebuilds the sink at zero.
    pub fn load(&mut self, source: PathBuf, generation: u64) {
        self.generation = generation;
        self.load_generation = generation;
        self.source = Some(source);
        self.total = None;
    }

    /// Resume output. Returns the position to rebuild at when the source
    /// already ended and has to start over.
    pub fn play(&mut self) -> Option<Duration> {
        self.paused = false;
        self.ended.then_some(Duration::ZERO)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Returns the position, clamped to the known total, to rebuild at.
    /// `None` when nothing is loaded.
    pub fn set_position(&mut self, position: Duration, generation: u64) -> Option<Duration> {
        self.source.as_ref()?;
        self.generation = generation;
        Some(self.total.map_or(position, |t| position.min(t)))
    }

    /// A fresh sink replaced the old one.
    pub fn rebuilt(&mut self, total: Option<Duration>) {
        self.ended = false;
        if total.is_some() {
            self.total = total;
        }
    }

    /// The source could not be opened; forget it.
    pub fn failed(&mut self) {
        self.ended = false;
        self.source = None;
        self.total = None;
    }

    /// Events for one tick of a live sink. Reaching the end reports `Ended`
    /// once and pauses until the next play or rebuild.
    pub fn tick(&mut self, sink_empty: bool, elapsed: Duration) -> Vec<PrimitiveEvent> {
        if self.paused || self.ended {
            return Vec::new();
        }

        if sink_empty {
            self.ended = true;
            self.paused = true;
            return vec![
                PrimitiveEvent::Progress {
                    elapsed: self.total.unwrap_or(elapsed),
                    total: self.total,
                },
                PrimitiveEvent::Ended,
            ];
        }

        vec![PrimitiveEvent::Progress {
            elapsed: self.total.map_or(elapsed, |t| elapsed.min(t)),
            total: self.total,
        }]
    }
}
