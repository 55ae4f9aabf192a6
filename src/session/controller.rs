use std::time::Duration;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::library::{Playlist, Track, TrackId};

use super::SessionError;
use super::model::{Direction, PlaybackSession};
use super::primitive::{PlaybackPrimitive, PrimitiveEvent};

/// Owns the playlist, the session and the playback primitive, and keeps the
/// latter two in step.
///
/// Every operation mutates the session synchronously and then issues the
/// matching command(s) to the primitive. Events coming back from the primitive
/// enter through [`on_primitive_event`](Self::on_primitive_event).
pub struct PlaybackSessionController<P, R = StdRng> {
    playlist: Playlist,
    session: PlaybackSession,
    primitive: P,
    rng: R,
}

impl<P: PlaybackPrimitive> PlaybackSessionController<P> {
    pub fn new(playlist: Playlist, primitive: P) -> Self {
        Self::with_rng(playlist, primitive, StdRng::from_os_rng())
    }
}

impl<P: PlaybackPrimitive, R: Rng> PlaybackSessionController<P, R> {
    /// Create a controller drawing shuffle picks from `rng`.
    ///
    /// The session starts on the first track, paused, at full volume; the
    /// primitive is bound to that track right away.
    pub fn with_rng(playlist: Playlist, mut primitive: P, rng: R) -> Self {
        let session = PlaybackSession::new(playlist.first().id);
        primitive.set_volume(session.volume);
        primitive.load(&playlist.first().source);

        Self {
            playlist,
            session,
            primitive,
            rng,
        }
    }

    /// A copy of the current session for rendering.
    pub fn snapshot(&self) -> PlaybackSession {
        self.session
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    pub fn current_index(&self) -> usize {
        self.playlist
            .position(self.session.current_track_id)
            .unwrap_or(0)
    }

    pub fn current_track(&self) -> &Track {
        &self.playlist.tracks()[self.current_index()]
    }

    /// Total length of the current track as reported by the primitive.
    pub fn duration(&self) -> Option<Duration> {
        self.primitive.duration()
    }

    /// Elapsed time derived from the progress fraction, once the length is known.
    pub fn position(&self) -> Option<Duration> {
        self.duration()
            .map(|total| total.mul_f32(self.session.progress))
    }

    /// Make `id` the current track and restart it from the beginning.
    ///
    /// Selecting the track that is already current restarts it too.
    pub fn select_track(&mut self, id: TrackId) -> Result<(), SessionError> {
        let index = self
            .playlist
            .position(id)
            .ok_or(SessionError::UnknownTrack(id))?;
        self.load_index(index);
        Ok(())
    }

    /// Flip between playing and paused. Returns the new state.
    pub fn toggle_play_pause(&mut self) -> bool {
        self.session.is_playing = !self.session.is_playing;
        if self.session.is_playing {
            self.primitive.play();
        } else {
            self.primitive.pause();
        }
        debug!("playing: {}", self.session.is_playing);
        self.session.is_playing
    }

    /// Move to the next or previous track and start playing it.
    ///
    /// `Previous` always steps back in playlist order. `Next` steps forward,
    /// or picks any track at random (the current one included) with shuffle on.
    pub fn advance(&mut self, direction: Direction) -> TrackId {
        let len = self.playlist.len();
        let current = self.current_index();

        let target = match direction {
            Direction::Previous => (current + len - 1) % len,
            Direction::Next if self.session.shuffle_enabled => self.rng.random_range(0..len),
            Direction::Next => (current + 1) % len,
        };

        self.session.is_playing = true;
        self.load_index(target);
        self.session.current_track_id
    }

    /// Store and apply a new volume. Values outside `[0, 1]` are clamped.
    pub fn set_volume(&mut self, volume: f32) -> Result<f32, SessionError> {
        if volume.is_nan() {
            return Err(SessionError::InvalidArgument {
                name: "volume",
                value: volume,
            });
        }

        let clamped = volume.clamp(0.0, 1.0);
        if clamped != volume {
            debug!("volume {volume} clamped to {clamped}");
        }
        self.session.volume = clamped;
        self.primitive.set_volume(clamped);
        Ok(clamped)
    }

    /// Jump to `fraction` of the current track.
    ///
    /// Does nothing while the primitive has not reported a length yet.
    pub fn seek(&mut self, fraction: f32) -> Result<(), SessionError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(SessionError::InvalidArgument {
                name: "seek fraction",
                value: fraction,
            });
        }

        let Some(total) = self.primitive.duration().filter(|d| !d.is_zero()) else {
            debug!("seek to {fraction} ignored, duration not known yet");
            return Ok(());
        };

        self.primitive.set_position(total.mul_f32(fraction));
        self.session.progress = fraction;
        Ok(())
    }

    /// Flip shuffle. Returns the new state.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.session.shuffle_enabled = !self.session.shuffle_enabled;
        debug!("shuffle: {}", self.session.shuffle_enabled);
        self.session.shuffle_enabled
    }

    /// Flip repeat. Returns the new state.
    pub fn toggle_repeat(&mut self) -> bool {
        self.session.repeat_enabled = !self.session.repeat_enabled;
        debug!("repeat: {}", self.session.repeat_enabled);
        self.session.repeat_enabled
    }

    pub fn on_primitive_progress(&mut self, elapsed: Duration, total: Option<Duration>) {
        let Some(total) = total.filter(|t| !t.is_zero()) else {
            return;
        };
        self.session.progress = (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0);
    }

    /// The current track finished: restart it with repeat on, otherwise move on.
    pub fn on_primitive_ended(&mut self) {
        if self.session.repeat_enabled {
            trace!("repeating track {}", self.session.current_track_id);
            self.primitive.set_position(Duration::ZERO);
            self.session.progress = 0.0;
            self.session.is_playing = true;
            self.primitive.play();
        } else {
            self.advance(Direction::Next);
        }
    }

    pub fn on_primitive_event(&mut self, event: PrimitiveEvent) {
        match event {
            PrimitiveEvent::Progress { elapsed, total } => {
                self.on_primitive_progress(elapsed, total)
            }
            PrimitiveEvent::Ended => self.on_primitive_ended(),
            PrimitiveEvent::Error(msg) => {
                warn!(
                    "playback of {} failed: {msg}",
                    self.current_track().source.display()
                )
            }
        }
    }

    fn load_index(&mut self, index: usize) {
        let track = &self.playlist.tracks()[index];
        debug!("loading track {} ({})", track.id, track.source.display());

        self.session.current_track_id = track.id;
        self.session.progress = 0.0;
        self.primitive.load(&track.source);
        if self.session.is_playing {
            self.primitive.play();
        }
    }
}
