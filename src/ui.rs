//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. Nothing
//! here mutates playback; it only reads the session snapshot and the view
//! model.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::config::{ControlsSettings, TimeField, TrackDisplayField, UiSettings};
use crate::library::{Playlist, Track};
use crate::session::PlaybackSession;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("zz", "jump to current");
    map.insert("enter", "play selected song");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next song");
    // H/L and +/- are filled dynamically from config.
    map.insert("s", "shuffle");
    map.insert("r", "repeat");
    map.insert("t", "theme");
    map.insert("P", "playlist");
    map.insert("K", "metadata");
    map.insert("q", "quit");
    map
});

/// Colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Palette {
    fg: Color,
    bg: Color,
    accent: Color,
    dim: Color,
}

fn palette(dark_mode: bool) -> Palette {
    if dark_mode {
        Palette {
            fg: Color::Gray,
            bg: Color::Black,
            accent: Color::Cyan,
            dim: Color::DarkGray,
        }
    } else {
        Palette {
            fg: Color::Black,
            bg: Color::White,
            accent: Color::Blue,
            dim: Color::Gray,
        }
    }
}

/// Render the controls help text, incorporating the seek and volume steps.
fn controls_text(controls: &ControlsSettings) -> String {
    let order = [
        "j/k", "h/l", "H/L", "+/-", "enter", "space/p", "gg/G", "zz", "s", "r", "t", "P", "K",
        "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!(
                "[H/L] seek -/+{}%",
                percent(controls.seek_step)
            )),
            "+/-" => Some(format!(
                "[+/-] volume +/-{}%",
                percent(controls.volume_step)
            )),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn percent(fraction: f32) -> u32 {
    (fraction * 100.0).round() as u32
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

/// Build the "now playing" track text according to `ui` settings.
fn now_playing_track_text(track: &Track, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in &ui.now_playing_track_fields {
        let part = match f {
            TrackDisplayField::Display => non_blank(&track.display).map(str::to_string),
            TrackDisplayField::Title => non_blank(&track.title).map(str::to_string),
            TrackDisplayField::Artist => non_blank(&track.artist).map(str::to_string),
            TrackDisplayField::Album => track.album.as_deref().and_then(non_blank).map(str::to_string),
            TrackDisplayField::Filename => track
                .source
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(non_blank)
                .map(str::to_string),
            TrackDisplayField::Path => Some(track.source.display().to_string()),
        };
        parts.extend(part);
    }

    if parts.is_empty() {
        track.display.clone()
    } else {
        parts.join(&ui.now_playing_track_separator)
    }
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Visible window `[start, end)` of `total` rows that keeps `selected` centered.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let start = selected.saturating_sub(half).min(total - height);
    (start, start + height)
}

fn left_padding() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    playlist: &Playlist,
    session: &PlaybackSession,
    total: Option<Duration>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let colors = palette(app.dark_mode);
    let base = Style::default().fg(colors.fg).bg(colors.bg);
    frame.render_widget(Block::default().style(base), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(9),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(colors.accent))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" andante ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let (list_area, player_area) = if app.playlist_open {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);
        (Some(body[0]), body[1])
    } else {
        (None, chunks[1])
    };

    if let Some(area) = list_area {
        draw_playlist(frame, area, app, playlist, session, colors);
    }
    draw_now_playing(frame, player_area, app, playlist, session, total, ui_settings, colors);

    let status = status_text(app, playlist, session);
    let status_par = Paragraph::new(status)
        .block(Block::bordered().padding(left_padding()).title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[2]);

    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 10, chunks[1]);
        frame.render_widget(Clear, popup_area);
        let meta = playlist
            .get(app.cursor)
            .map(metadata_text)
            .unwrap_or_else(|| "No track selected".to_string());
        let meta_paragraph = Paragraph::new(meta)
            .style(base)
            .block(
                Block::default()
                    .padding(left_padding())
                    .borders(Borders::ALL)
                    .title(" metadata (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings))
        .style(Style::default().fg(colors.dim))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_padding()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_playlist(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    playlist: &Playlist,
    session: &PlaybackSession,
    colors: Palette,
) {
    let tracks = playlist.tracks();
    // Only build ListItems for the visible window.
    let (start, end) = visible_window(tracks.len(), area.height.saturating_sub(2) as usize, app.cursor);

    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .map(|track| {
            let mut spans = vec![Span::raw(track.title.clone())];
            if let Some(artist) = non_blank(&track.artist) {
                spans.push(Span::styled(format!("  {artist}"), Style::default().fg(colors.dim)));
            }
            spans.push(Span::raw(format!("  {}", track.duration_label)));
            let item = ListItem::new(Line::from(spans));
            if track.id == session.current_track_id() {
                item.style(
                    Style::default()
                        .fg(colors.accent)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" playlist "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !tracks.is_empty() {
        state.select(Some(app.cursor - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

#[allow(clippy::too_many_arguments)]
fn draw_now_playing(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    playlist: &Playlist,
    session: &PlaybackSession,
    total: Option<Duration>,
    ui: &UiSettings,
    colors: Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" now playing ")
        .padding(left_padding());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let Some(track) = playlist.find(session.current_track_id()) else {
        return;
    };

    let disc = if session.is_playing() {
        app.spinner_frame()
    } else {
        '●'
    };
    let mut info = vec![Line::from(vec![
        Span::styled(format!("{disc} "), Style::default().fg(colors.accent)),
        Span::styled(
            now_playing_track_text(track, ui),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])];
    if let Some(artist) = non_blank(&track.artist) {
        info.push(Line::from(format!("  {artist}")));
    }
    if let Some(cover) = &track.cover_art {
        info.push(Line::styled(
            format!("  cover: {cover}"),
            Style::default().fg(colors.dim),
        ));
    }
    frame.render_widget(Paragraph::new(info), rows[0]);

    frame.render_widget(
        Paragraph::new(controls_row(session, colors)).alignment(Alignment::Center),
        rows[1],
    );

    let elapsed = total
        .map(|t| t.mul_f32(session.progress()))
        .unwrap_or_default();
    let time = now_playing_time_text(elapsed, total, ui).unwrap_or_default();
    let progress = Gauge::default()
        .gauge_style(Style::default().fg(colors.accent).bg(colors.dim))
        .ratio(f64::from(session.progress()).clamp(0.0, 1.0))
        .label(time);
    frame.render_widget(progress, rows[3]);

    let volume = Gauge::default()
        .gauge_style(Style::default().fg(colors.fg).bg(colors.dim))
        .ratio(f64::from(session.volume()).clamp(0.0, 1.0))
        .label(format!("vol {}%", percent(session.volume())));
    frame.render_widget(volume, rows[4]);
}

fn controls_row(session: &PlaybackSession, colors: Palette) -> Line<'static> {
    let toggle = |label: &'static str, on: bool| {
        if on {
            Span::styled(
                label,
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(label, Style::default().fg(colors.dim))
        }
    };
    let play = if session.is_playing() { "⏸" } else { "▶" };
    Line::from(vec![
        toggle("shuffle", session.shuffle_enabled()),
        Span::raw("   ⏮   "),
        Span::styled(play, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   ⏭   "),
        toggle("repeat", session.repeat_enabled()),
    ])
}

fn status_text(app: &App, playlist: &Playlist, session: &PlaybackSession) -> String {
    if let Some(msg) = &app.status_message {
        return msg.clone();
    }

    let mut parts: Vec<String> = Vec::new();
    if app.follow_playback {
        parts.push("CURSOR: Follow".to_string());
    } else {
        parts.push("CURSOR: Free-roam".to_string());
    }
    let state = if session.is_playing() { "Playing" } else { "Paused" };
    parts.push(state.to_string());
    parts.push(format!(
        "Track {}/{}",
        playlist
            .position(session.current_track_id())
            .map_or(0, |i| i + 1),
        playlist.len()
    ));
    if let Some(source) = &app.source_label {
        parts.push(format!("Source: {}", source));
    }
    parts.join(" • ")
}

fn metadata_text(track: &Track) -> String {
    format!(
        "Title: {}\nArtist: {}\nAlbum: {}\nDuration: {}\nSource: {}\nCover: {}",
        track.title,
        non_blank(&track.artist).unwrap_or("-"),
        track.album.as_deref().unwrap_or("-"),
        track.duration_label,
        track.source.display(),
        track.cover_art.as_deref().unwrap_or("-"),
    )
}
