use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use log::debug;

use crate::config::AudioSettings;
use crate::session::{PlaybackPrimitive, PrimitiveEvent};

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioEvent, PlaybackHandle, PlaybackInfo};

/// A [`PlaybackPrimitive`] backed by `rodio` on a dedicated audio thread.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    events: Receiver<AudioEvent>,
    playback: PlaybackHandle,
    /// Bumped by every load and seek; events carry it.
    generation: u64,
    load_generation: u64,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(audio_settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (event_tx, event_rx) = mpsc::channel::<AudioEvent>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let audio_handle =
            spawn_audio_thread(rx, event_tx, playback_info.clone(), audio_settings);

        Self::from_parts(tx, event_rx, playback_info, Some(audio_handle))
    }

    pub(super) fn from_parts(
        tx: Sender<AudioCmd>,
        events: Receiver<AudioEvent>,
        playback: PlaybackHandle,
        join: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            tx,
            events,
            playback,
            generation: 0,
            load_generation: 0,
            join: Mutex::new(join),
        }
    }

    /// Drain the events the audio thread reported since the last call.
    /// Events about previously loaded sources are dropped.
    pub fn poll_events(&self) -> Vec<PrimitiveEvent> {
        fresh_events(&self.events, self.generation)
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if let Err(e) = self.tx.send(cmd) {
            debug!("audio thread is gone, dropping {:?}", e.0);
        }
    }
}

impl PlaybackPrimitive for AudioPlayer {
    fn load(&mut self, source: &Path) {
        self.generation += 1;
        self.load_generation = self.generation;
        self.send(AudioCmd::Load {
            source: source.to_path_buf(),
            generation: self.generation,
        });
    }

    fn play(&mut self) {
        self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCmd::SetVolume(volume));
    }

    fn set_position(&mut self, position: Duration) {
        self.generation += 1;
        self.send(AudioCmd::SetPosition {
            position,
            generation: self.generation,
        });
    }

    fn duration(&self) -> Option<Duration> {
        self.playback
            .lock()
            .ok()
            .filter(|info| info.load_generation == self.load_generation)
            .and_then(|info| info.total)
    }
}

pub(super) fn fresh_events(events: &Receiver<AudioEvent>, generation: u64) -> Vec<PrimitiveEvent> {
    events
        .try_iter()
        .filter(|e| e.generation == generation)
        .map(|e| e.event)
        .collect()
}
