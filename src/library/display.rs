use std::path::Path;
use std::time::Duration;

use crate::config::TrackDisplayField;

/// Build a display string for a track according to the provided `fields` and separator.
///
/// This composes metadata fields (artist, title, album, filename, path) in the
/// configured order and falls back to `title` when no parts were produced.
pub fn display_from_fields(
    path: &Path,
    title: &str,
    artist: &str,
    album: Option<&str>,
    fields: &[TrackDisplayField],
    sep: &str,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    let artist = artist.trim();

    for f in fields {
        match f {
            TrackDisplayField::Display => {
                // "display" inside the list itself means the classic "artist - title".
                if !artist.is_empty() {
                    parts.push(artist.to_string());
                }
                if !title.trim().is_empty() {
                    parts.push(title.trim().to_string());
                }
            }
            TrackDisplayField::Title => {
                if !title.trim().is_empty() {
                    parts.push(title.trim().to_string());
                }
            }
            TrackDisplayField::Artist => {
                if !artist.is_empty() {
                    parts.push(artist.to_string());
                }
            }
            TrackDisplayField::Album => {
                if let Some(a) = album.map(str::trim).filter(|s| !s.is_empty()) {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Filename => {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if !stem.trim().is_empty() {
                        parts.push(stem.to_string());
                    }
                }
            }
            TrackDisplayField::Path => {
                parts.push(path.display().to_string());
            }
        }
    }

    if parts.is_empty() {
        title.to_string()
    } else {
        parts.join(sep)
    }
}

/// Format a track length as `m:ss`, or `-` when unknown.
pub fn duration_label(d: Option<Duration>) -> String {
    match d {
        Some(d) => {
            let secs = d.as_secs();
            format!("{}:{:02}", secs / 60, secs % 60)
        }
        None => "-".to_string(),
    }
}
