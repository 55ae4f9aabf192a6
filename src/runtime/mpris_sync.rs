use rand::Rng;

use crate::library::TrackId;
use crate::mpris::MprisHandle;
use crate::session::{PlaybackPrimitive, PlaybackSessionController};

/// What MPRIS last saw; a change triggers a metadata refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MprisSnapshot {
    track_id: TrackId,
    playing: bool,
    shuffle: bool,
    repeat: bool,
    volume: f32,
    length_known: bool,
}

impl MprisSnapshot {
    pub fn of<P: PlaybackPrimitive, R: Rng>(controller: &PlaybackSessionController<P, R>) -> Self {
        let session = controller.snapshot();
        Self {
            track_id: session.current_track_id(),
            playing: session.is_playing(),
            shuffle: session.shuffle_enabled(),
            repeat: session.repeat_enabled(),
            volume: session.volume(),
            length_known: controller.duration().is_some(),
        }
    }
}

pub fn update_mpris<P: PlaybackPrimitive, R: Rng>(
    mpris: &MprisHandle,
    controller: &PlaybackSessionController<P, R>,
) {
    let session = controller.snapshot();
    mpris.set_track_metadata(controller.current_track(), controller.duration());
    mpris.set_playback(session.is_playing());
    mpris.set_modes(
        session.shuffle_enabled(),
        session.repeat_enabled(),
        session.volume(),
    );
    mpris.set_position(controller.position().unwrap_or_default());
}
