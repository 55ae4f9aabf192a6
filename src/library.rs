//! Track model, playlist and the two ways of building one: scanning a music
//! directory or reading a TOML playlist manifest.

use std::io;

use thiserror::Error;

mod display;
mod manifest;
mod model;
mod scan;

pub use manifest::{is_manifest, load_manifest};
pub use model::{Playlist, Track, TrackId};
pub use scan::scan;

/// Errors raised while building a playlist.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("the playlist has no tracks")]
    EmptyPlaylist,
    #[error("track id {0} is used more than once")]
    DuplicateId(TrackId),
    #[error("failed to read playlist manifest, {0}")]
    Io(#[from] io::Error),
    #[error("invalid playlist manifest, {0}")]
    Manifest(#[from] toml::de::Error),
}
