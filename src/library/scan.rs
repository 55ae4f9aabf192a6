use std::path::Path;
use std::time::Duration;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use log::{debug, trace};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::{display_from_fields, duration_label};
use super::model::{Track, TrackId};

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Walk `dir` and build tracks for every audio file found.
///
/// Tracks are sorted by their display label (case-insensitive) and numbered
/// `1..=N` in that order.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file()
            || (!settings.include_hidden && is_hidden(path))
            || !is_audio_file(path, settings)
        {
            continue;
        }

        let mut title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let mut artist = String::new();
        let mut album: Option<String> = None;
        let mut duration: Option<Duration> = None;

        match lofty::read_from_path(path) {
            Ok(tagged) => {
                duration = Some(tagged.properties().duration()).filter(|d| !d.is_zero());

                if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                    if let Some(v) = tag.title().filter(|v| !v.trim().is_empty()) {
                        title = v.to_string();
                    }
                    if let Some(v) = tag.artist() {
                        artist = v.trim().to_string();
                    }
                    album = tag
                        .album()
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty());
                }
            }
            Err(e) => trace!("no readable tags in {}: {e}", path.display()),
        }

        let display = display_from_fields(
            path,
            &title,
            &artist,
            album.as_deref(),
            &settings.display_fields,
            &settings.display_separator,
        );

        tracks.push(Track {
            id: 0,
            title,
            artist,
            album,
            duration_label: duration_label(duration),
            source: path.to_path_buf(),
            cover_art: None,
            display,
        });
    }

    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    for (i, track) in tracks.iter_mut().enumerate() {
        track.id = (i + 1) as TrackId;
    }

    debug!("scanned {} tracks from {}", tracks.len(), dir.display());
    tracks
}
