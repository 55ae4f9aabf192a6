use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, error, warn};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::config::AudioSettings;
use crate::session::PrimitiveEvent;

use super::clock::PlaybackClock;
use super::sink::create_sink_at;
use super::transport::Transport;
use super::types::{AudioCmd, AudioError, AudioEvent, PlaybackHandle};

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<AudioEvent>,
    playback_info: PlaybackHandle,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let err = AudioError::NoOutputDevice(e.to_string());
                error!("{err}");
                reject_all(rx, events, err.to_string());
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        let interval = Duration::from_millis(audio_settings.progress_interval_ms.max(1));
        let mut audio = AudioThread {
            stream,
            events,
            playback_info,
            transport: Transport::new(),
            sink: None,
            volume: 1.0,
            clock: PlaybackClock::default(),
        };

        let mut last_tick = Instant::now();
        loop {
            let timeout = interval.saturating_sub(last_tick.elapsed());
            match rx.recv_timeout(timeout) {
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    audio.quit(fade_out_ms);
                    break;
                }
                Ok(cmd) => audio.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if last_tick.elapsed() >= interval {
                audio.tick();
                last_tick = Instant::now();
            }
        }
        debug!("audio thread stopped");
    })
}

/// Without an output device every load fails; keep answering until told to quit.
fn reject_all(rx: Receiver<AudioCmd>, events: Sender<AudioEvent>, reason: String) {
    for cmd in rx {
        match cmd {
            AudioCmd::Load { generation, .. } => {
                let _ = events.send(AudioEvent {
                    generation,
                    event: PrimitiveEvent::Error(reason.clone()),
                });
            }
            AudioCmd::Quit { .. } => break,
            _ => {}
        }
    }
}

struct AudioThread {
    stream: OutputStream,
    events: Sender<AudioEvent>,
    playback_info: PlaybackHandle,
    transport: Transport,
    sink: Option<Sink>,
    volume: f32,
    clock: PlaybackClock,
}

impl AudioThread {
    fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load { source, generation } => {
                self.transport.load(source, generation);
                self.rebuild_at(Duration::ZERO);
            }
            AudioCmd::Play => {
                if let Some(pos) = self.transport.play() {
                    self.rebuild_at(pos);
                }
                if let Some(ref s) = self.sink {
                    s.play();
                    self.clock.start();
                }
            }
            AudioCmd::Pause => {
                self.transport.pause();
                if let Some(ref s) = self.sink {
                    s.pause();
                }
                self.clock.pause();
            }
            AudioCmd::SetVolume(v) => {
                self.volume = v;
                if let Some(ref s) = self.sink {
                    s.set_volume(v);
                }
            }
            AudioCmd::SetPosition {
                position,
                generation,
            } => {
                // Scrubbing: rebuild the current sink and skip into the file.
                if let Some(pos) = self.transport.set_position(position, generation) {
                    self.rebuild_at(pos);
                }
            }
            AudioCmd::Quit { fade_out_ms } => self.quit(fade_out_ms),
        }
    }

    /// Replace the sink with a fresh one for the current source, starting at `pos`.
    fn rebuild_at(&mut self, pos: Duration) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.clock.pause();
        self.clock.reset(pos);

        let Some(path) = self.transport.source.clone() else {
            self.transport.failed();
            self.publish();
            return;
        };

        match create_sink_at(&self.stream, &path, pos) {
            Ok((sink, total)) => {
                sink.set_volume(self.volume);
                if !self.transport.paused {
                    sink.play();
                    self.clock.start();
                }
                self.transport.rebuilt(total);
                self.sink = Some(sink);
            }
            Err(e) => {
                warn!("{e}");
                self.transport.failed();
                self.emit(PrimitiveEvent::Error(e.to_string()));
            }
        }
        self.publish();
    }

    fn tick(&mut self) {
        let Some(ref sink) = self.sink else {
            return;
        };
        let events = self.transport.tick(sink.empty(), self.clock.elapsed());
        if self.transport.ended {
            self.clock.pause();
        }
        for event in events {
            self.emit(event);
        }
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(s) = self.sink.take() {
            if !self.transport.paused {
                fade_out_sink(&s, self.volume, fade_out_ms);
            }
            s.stop();
        }
    }

    fn publish(&self) {
        if let Ok(mut info) = self.playback_info.lock() {
            info.load_generation = self.transport.load_generation;
            info.total = self.transport.total;
        }
    }

    fn emit(&self, event: PrimitiveEvent) {
        let _ = self.events.send(AudioEvent {
            generation: self.transport.generation,
            event,
        });
    }
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
