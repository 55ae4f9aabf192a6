use std::path::Path;

use log::{info, warn};
use rand::Rng;

use crate::config::{LibrarySettings, PlaybackSettings};
use crate::library::{LibraryError, Playlist, is_manifest, load_manifest, scan};
use crate::session::{PlaybackPrimitive, PlaybackSessionController};

/// Build the playlist from a manifest file or by scanning a directory.
pub fn load_playlist(source: &Path, settings: &LibrarySettings) -> Result<Playlist, LibraryError> {
    let playlist = if is_manifest(source) {
        load_manifest(source, settings)?
    } else {
        Playlist::new(scan(source, settings))?
    };
    info!(
        "loaded {} tracks from {}",
        playlist.len(),
        source.display()
    );
    Ok(playlist)
}

/// Bring a fresh session in line with the configured shuffle, repeat and volume.
pub fn apply_playback_defaults<P: PlaybackPrimitive, R: Rng>(
    controller: &mut PlaybackSessionController<P, R>,
    settings: &PlaybackSettings,
) {
    let session = controller.snapshot();
    if settings.shuffle != session.shuffle_enabled() {
        controller.toggle_shuffle();
    }
    if settings.repeat != session.repeat_enabled() {
        controller.toggle_repeat();
    }
    if let Err(e) = controller.set_volume(settings.volume) {
        warn!("ignoring configured volume: {e}");
    }
}
