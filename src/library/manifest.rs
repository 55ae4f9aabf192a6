//! Playlist manifests: a TOML file listing tracks explicitly.
//!
//! ```toml
//! [[track]]
//! id = 1
//! title = "Song 1"
//! artist = "Artist 1"
//! duration = "3:30"
//! src = "music/song1.mp3"
//! cover = "covers/song1.png"
//! ```
//!
//! Relative `src` and `cover` paths are resolved against the manifest's directory.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::config::LibrarySettings;

use super::LibraryError;
use super::display::display_from_fields;
use super::model::{Playlist, Track, TrackId};

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "track", default)]
    tracks: Vec<ManifestTrack>,
}

#[derive(Debug, Deserialize)]
struct ManifestTrack {
    id: TrackId,
    title: String,
    #[serde(default)]
    artist: String,
    #[serde(default)]
    album: Option<String>,
    #[serde(default = "unknown_duration")]
    duration: String,
    src: PathBuf,
    #[serde(default)]
    cover: Option<String>,
}

fn unknown_duration() -> String {
    "-".to_string()
}

/// Return true when `path` looks like a playlist manifest rather than a music directory.
pub fn is_manifest(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("toml"))
            .unwrap_or(false)
}

/// Read and parse the manifest at `path`.
pub fn load_manifest(path: &Path, settings: &LibrarySettings) -> Result<Playlist, LibraryError> {
    let text = fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let playlist = parse_manifest(&text, base, settings)?;
    debug!(
        "loaded {} tracks from manifest {}",
        playlist.len(),
        path.display()
    );
    Ok(playlist)
}

pub(crate) fn parse_manifest(
    text: &str,
    base: &Path,
    settings: &LibrarySettings,
) -> Result<Playlist, LibraryError> {
    let manifest: Manifest = toml::from_str(text)?;

    let tracks = manifest
        .tracks
        .into_iter()
        .map(|t| {
            let source = if t.src.is_absolute() {
                t.src
            } else {
                base.join(t.src)
            };
            let cover_art = t.cover.map(|c| resolve_locator(&c, base));
            let display = display_from_fields(
                &source,
                &t.title,
                &t.artist,
                t.album.as_deref(),
                &settings.display_fields,
                &settings.display_separator,
            );

            Track {
                id: t.id,
                title: t.title,
                artist: t.artist,
                album: t.album,
                duration_label: t.duration,
                source,
                cover_art,
                display,
            }
        })
        .collect();

    Playlist::new(tracks)
}

fn resolve_locator(locator: &str, base: &Path) -> String {
    let p = Path::new(locator);
    if locator.contains("://") || p.is_absolute() {
        locator.to_string()
    } else {
        base.join(p).display().to_string()
    }
}
