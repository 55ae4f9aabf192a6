use crate::library::TrackId;

/// Which way [`advance`](super::PlaybackSessionController::advance) moves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// The mutable playback configuration.
///
/// Only the controller writes it; everyone else works on copies handed out by
/// [`snapshot`](super::PlaybackSessionController::snapshot).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaybackSession {
    pub(super) current_track_id: TrackId,
    pub(super) is_playing: bool,
    pub(super) volume: f32,
    pub(super) progress: f32,
    pub(super) shuffle_enabled: bool,
    pub(super) repeat_enabled: bool,
}

impl PlaybackSession {
    pub(super) fn new(first_track: TrackId) -> Self {
        Self {
            current_track_id: first_track,
            is_playing: false,
            volume: 1.0,
            progress: 0.0,
            shuffle_enabled: false,
            repeat_enabled: false,
        }
    }

    pub fn current_track_id(&self) -> TrackId {
        self.current_track_id
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Output gain in `[0, 1]`.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Elapsed fraction of the current track in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn repeat_enabled(&self) -> bool {
        self.repeat_enabled
    }
}
