//! The `App` view model.
//!
//! Holds presentation-only state: the playlist cursor, which panels are open,
//! the palette and transient status text. Playback state lives in the
//! session controller and is never stored here.

use crate::config::UiSettings;

const SPINNER_FRAMES: [char; 4] = ['◐', '◓', '◑', '◒'];

/// The main view model.
pub struct App {
    /// Number of rows in the playlist.
    len: usize,
    /// Cursor position in the playlist (row index).
    pub cursor: usize,
    pub follow_playback: bool,
    pub playlist_open: bool,
    pub dark_mode: bool,
    pub metadata_window: bool,
    pub status_message: Option<String>,
    pub source_label: Option<String>,
    spinner: usize,
}

impl App {
    /// Create a new `App` for a playlist of `len` tracks.
    pub fn new(len: usize, ui: &UiSettings) -> Self {
        Self {
            len,
            cursor: 0,
            follow_playback: ui.follow_playback,
            playlist_open: ui.playlist_open,
            dark_mode: ui.dark_mode,
            metadata_window: false,
            status_message: None,
            source_label: None,
            spinner: 0,
        }
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    pub fn toggle_playlist(&mut self) {
        self.playlist_open = !self.playlist_open;
    }

    pub fn toggle_theme(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    /// Record where the playlist came from (directory or manifest).
    pub fn set_source_label(&mut self, label: String) {
        self.source_label = Some(label);
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Move the cursor to `idx`, clamped to the playlist.
    pub fn set_cursor(&mut self, idx: usize) {
        self.cursor = idx.min(self.len.saturating_sub(1));
    }

    /// Move the cursor down one row, wrapping to the top.
    pub fn next(&mut self) {
        if self.len > 0 {
            self.cursor = (self.cursor + 1) % self.len;
        }
    }

    /// Move the cursor up one row, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.len > 0 {
            self.cursor = (self.cursor + self.len - 1) % self.len;
        }
    }

    pub fn first(&mut self) {
        self.cursor = 0;
    }

    pub fn last(&mut self) {
        self.cursor = self.len.saturating_sub(1);
    }

    /// Enable following playback (cursor tracks the current song).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    /// Disable following playback; the cursor roams freely.
    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Keep the cursor on the current track while following playback.
    pub fn follow(&mut self, current_index: usize) {
        if self.follow_playback {
            self.set_cursor(current_index);
        }
    }

    /// Advance the "spinning disc" animation one frame.
    pub fn tick_spinner(&mut self) {
        self.spinner = (self.spinner + 1) % SPINNER_FRAMES.len();
    }

    pub fn spinner_frame(&self) -> char {
        SPINNER_FRAMES[self.spinner]
    }
}
