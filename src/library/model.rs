use std::path::PathBuf;

use super::LibraryError;

/// Identifier of a track, unique within a playlist.
pub type TrackId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    /// Empty when the artist is unknown.
    pub artist: String,
    pub album: Option<String>,
    /// Human readable length such as `3:30`. Only used for display; the
    /// playback backend reports the real duration once the source is loaded.
    pub duration_label: String,
    pub source: PathBuf,
    pub cover_art: Option<String>,
    pub display: String,
}

/// An ordered, non-empty list of tracks with unique ids.
#[derive(Debug, Clone)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Result<Self, LibraryError> {
        if tracks.is_empty() {
            return Err(LibraryError::EmptyPlaylist);
        }

        for (i, track) in tracks.iter().enumerate() {
            if tracks[..i].iter().any(|t| t.id == track.id) {
                return Err(LibraryError::DuplicateId(track.id));
            }
        }

        Ok(Self { tracks })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn first(&self) -> &Track {
        &self.tracks[0]
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Position of the track with `id` in playlist order.
    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn find(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }
}
